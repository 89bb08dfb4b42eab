//! Key and mouse mapping from terminal events to game input.

use crate::pointer::PointerEvent;
use crate::types::{Direction, GameAction, Mode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        _ => None,
    }
}

/// Map keyboard input to game actions.
///
/// Arrows, `hjkl` and `wasd` move the cursor; shift+arrows or `HJKL` slide
/// (Sliders mode).
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if let Some(dir) = arrow(key.code) {
        return Some(if key.modifiers.contains(KeyModifiers::SHIFT) {
            GameAction::Slide(dir)
        } else {
            GameAction::MoveCursor(dir)
        });
    }

    match key.code {
        // Cursor
        KeyCode::Char('h') | KeyCode::Char('a') => Some(GameAction::MoveCursor(Direction::Left)),
        KeyCode::Char('l') | KeyCode::Char('d') => Some(GameAction::MoveCursor(Direction::Right)),
        KeyCode::Char('k') | KeyCode::Char('w') => Some(GameAction::MoveCursor(Direction::Up)),
        KeyCode::Char('j') | KeyCode::Char('s') => Some(GameAction::MoveCursor(Direction::Down)),

        // Slides
        KeyCode::Char('H') => Some(GameAction::Slide(Direction::Left)),
        KeyCode::Char('L') => Some(GameAction::Slide(Direction::Right)),
        KeyCode::Char('K') => Some(GameAction::Slide(Direction::Up)),
        KeyCode::Char('J') => Some(GameAction::Slide(Direction::Down)),

        KeyCode::Char(' ') | KeyCode::Enter => Some(GameAction::Select),

        // Modes
        KeyCode::Char('1') => Some(GameAction::SetMode(Mode::Simple)),
        KeyCode::Char('2') => Some(GameAction::SetMode(Mode::Timed)),
        KeyCode::Char('3') => Some(GameAction::SetMode(Mode::Explosions)),
        KeyCode::Char('4') => Some(GameAction::SetMode(Mode::Sliders)),

        // Lifecycle
        KeyCode::Char('n') | KeyCode::Char('N') => Some(GameAction::NewGame),
        KeyCode::Char('e') | KeyCode::Char('E') => Some(GameAction::EndGame),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(GameAction::Discard),

        _ => None,
    }
}

/// Left-button mouse activity; everything else is ignored.
pub fn handle_mouse_event(event: MouseEvent) -> Option<PointerEvent> {
    let (col, row) = (event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down { col, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Drag { col, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up { col, row }),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_cursor_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(GameAction::MoveCursor(Direction::Left))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('j'))),
            Some(GameAction::MoveCursor(Direction::Down))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('w'))),
            Some(GameAction::MoveCursor(Direction::Up))
        );
    }

    #[test]
    fn test_slide_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT)),
            Some(GameAction::Slide(Direction::Right))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('K'))),
            Some(GameAction::Slide(Direction::Up))
        );
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(' '))),
            Some(GameAction::Select)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('3'))),
            Some(GameAction::SetMode(Mode::Explosions))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('e'))),
            Some(GameAction::EndGame)
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_mouse_left_button_only() {
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 5, 6)),
            Some(PointerEvent::Down { col: 5, row: 6 })
        );
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 1, 2)),
            Some(PointerEvent::Up { col: 1, row: 2 })
        );
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Right), 5, 6)),
            None
        );
        assert_eq!(handle_mouse_event(mouse(MouseEventKind::Moved, 5, 6)), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
