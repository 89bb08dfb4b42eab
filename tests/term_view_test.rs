//! Terminal frontend tests - rendering and pointer mapping against a live session

use gemgrid::core::{FinishedGame, GameSession, MoveOutcome};
use gemgrid::input::{DragEnd, DragTracker, SlideIntent};
use gemgrid::term::{encode_diff_into, GameView, HudView, Viewport};
use gemgrid::types::{Coord, Direction, Mode};

fn session(mode: Mode) -> GameSession<Vec<FinishedGame>> {
    GameSession::new(mode, 77, Vec::new()).unwrap()
}

#[test]
fn term_view_renders_border_around_grid() {
    let view = GameView::default();
    let viewport = Viewport::new(80, 24);
    let fb = view.render(&session(Mode::Simple).snapshot(), &HudView::default(), viewport);
    let geo = view.geometry(viewport);

    let (left, top) = (geo.origin_col - 1, geo.origin_row - 1);
    let (right, bottom) = (geo.origin_col + geo.width(), geo.origin_row + geo.height());
    assert_eq!(fb.get(left, top).unwrap().ch, '┌');
    assert_eq!(fb.get(right, top).unwrap().ch, '┐');
    assert_eq!(fb.get(left, bottom).unwrap().ch, '└');
    assert_eq!(fb.get(right, bottom).unwrap().ch, '┘');
}

#[test]
fn term_view_click_through_geometry_selects_tile() {
    let view = GameView::default();
    let viewport = Viewport::new(100, 30);
    let geo = view.geometry(viewport);
    let mut s = session(Mode::Simple);

    let (col, row) = geo.tile_origin(Coord::new(6, 2));
    let at = geo.cell_at(col + 1, row + 1).unwrap();
    assert_eq!(at, Coord::new(6, 2));
    assert!(s.click(at));

    let fb = view.render(&s.snapshot(), &HudView::default(), viewport);
    let (px, py) = geo.tile_origin(at);
    assert_eq!(fb.get(px, py + 1).unwrap().ch, '[');
}

#[test]
fn term_view_drag_slides_row() {
    let view = GameView::default();
    let viewport = Viewport::new(100, 30);
    let geo = view.geometry(viewport);
    let mut s = session(Mode::Sliders);
    let mut drag = DragTracker::new(geo);

    let (col, row) = geo.tile_origin(Coord::new(3, 4));
    assert_eq!(drag.pointer_down(col, row, 0), Some(Coord::new(3, 4)));

    // Two columns is more than a quarter of a four-column tile.
    let intent = drag.pointer_move(col + 2, row, 10).unwrap();
    assert_eq!(
        intent,
        SlideIntent {
            at: Coord::new(3, 4),
            dir: Direction::Right
        }
    );
    let outcome = s.slide(intent.at, intent.dir);
    assert!(outcome.applied());
    let matched = outcome == MoveOutcome::Matched;
    drag.slide_result(true, matched, 10);

    // Cooldown swallows the next step.
    assert_eq!(drag.pointer_move(col + 4, row, 20), None);
    let end = drag.pointer_up();
    if matched {
        assert_eq!(end, None);
    } else {
        assert_eq!(end, Some(DragEnd::Slid));
    }
}

#[test]
fn term_view_sliders_tap_selects_then_slides_toward_neighbour() {
    let view = GameView::default();
    let viewport = Viewport::new(100, 30);
    let geo = view.geometry(viewport);
    let mut s = session(Mode::Sliders);
    let mut drag = DragTracker::new(geo);

    let tap = |drag: &mut DragTracker, at: Coord, now: u64| {
        let (col, row) = geo.tile_origin(at);
        drag.pointer_down(col, row, now);
        drag.pointer_up()
    };

    let first = Coord::new(3, 4);
    assert_eq!(tap(&mut drag, first, 0), Some(DragEnd::Tap(first)));
    assert!(s.click(first));
    assert_eq!(s.snapshot().selection, Some(first));

    let neighbour = Coord::new(4, 4);
    let before = s.engine().grid().clone();
    assert_eq!(tap(&mut drag, neighbour, 50), Some(DragEnd::Tap(neighbour)));
    assert!(s.click(neighbour));
    assert_eq!(s.snapshot().selection, None);
    assert!(!s.engine().grid().same_layout(&before));
}

#[test]
fn term_view_unchanged_frame_diffs_to_nothing() {
    let view = GameView::default();
    let viewport = Viewport::new(80, 24);
    let snap = session(Mode::Explosions).snapshot();
    let a = view.render(&snap, &HudView::default(), viewport);
    let b = view.render(&snap, &HudView::default(), viewport);

    let mut out = Vec::new();
    encode_diff_into(&a, &b, &mut out).unwrap();
    let mut changed = Vec::new();
    let mut moved = b.clone();
    moved.put_str(0, 0, "x", Default::default());
    encode_diff_into(&a, &moved, &mut changed).unwrap();
    assert!(changed.len() > out.len());
}
