//! Sliders drag gestures.
//!
//! A drag starts on a tile. Each time the pointer travels more than a quarter
//! of a tile from where the last shift was committed, one shift is requested
//! in the dominant axis. The caller reports back through
//! [`DragTracker::slide_result`]; only an applied shift moves the tracked tile
//! and starts the cooldown. A shift that produced matches ends the gesture and
//! blocks new drags for a while. A press released without any applied shift
//! counts as a click. Time is passed in by the caller so the tracker stays
//! deterministic.

use crate::pointer::GridGeometry;
use crate::types::{Coord, Direction, SLIDE_COOLDOWN_MS, SLIDE_MATCH_PAUSE_MS};

/// One shift the game loop should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideIntent {
    pub at: Coord,
    pub dir: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    /// Tile being dragged; follows applied shifts.
    at: Coord,
    anchor: (f32, f32),
    /// Requested shift and the pointer position it was requested from.
    pending: Option<(Direction, (f32, f32))>,
    shifted: bool,
}

/// How a gesture ended on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEnd {
    /// No shift was applied; treat it as a click on this tile.
    Tap(Coord),
    /// At least one shift was applied; run a final match check.
    Slid,
}

#[derive(Debug, Clone)]
pub struct DragTracker {
    geometry: GridGeometry,
    drag: Option<Drag>,
    cooldown_until_ms: u64,
    paused_until_ms: u64,
}

impl DragTracker {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            drag: None,
            cooldown_until_ms: 0,
            paused_until_ms: 0,
        }
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: GridGeometry) {
        self.geometry = geometry;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_paused(&self, now_ms: u64) -> bool {
        now_ms < self.paused_until_ms
    }

    /// Begin a drag on the tile under the pointer. Returns the tile, or
    /// `None` off the grid or during the post-match pause.
    pub fn pointer_down(&mut self, col: u16, row: u16, now_ms: u64) -> Option<Coord> {
        if self.is_paused(now_ms) {
            return None;
        }
        let at = self.geometry.cell_at(col, row)?;
        self.drag = Some(Drag {
            at,
            anchor: (col as f32, row as f32),
            pending: None,
            shifted: false,
        });
        Some(at)
    }

    /// Pointer moved while held. Requests at most one shift per call.
    pub fn pointer_move(&mut self, col: u16, row: u16, now_ms: u64) -> Option<SlideIntent> {
        if now_ms < self.cooldown_until_ms {
            return None;
        }
        let drag = self.drag.as_mut()?;

        let dx = col as f32 - drag.anchor.0;
        let dy = row as f32 - drag.anchor.1;
        let threshold_x = self.geometry.tile_w as f32 / 4.0;
        let threshold_y = self.geometry.tile_h as f32 / 4.0;

        let dir = if dx.abs() >= dy.abs() && dx.abs() > threshold_x {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy.abs() > threshold_y {
            if dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            }
        } else {
            return None;
        };

        drag.pending = Some((dir, (col as f32, row as f32)));
        Some(SlideIntent { at: drag.at, dir })
    }

    /// Report what the engine did with the last requested shift.
    pub fn slide_result(&mut self, applied: bool, matched: bool, now_ms: u64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let Some((dir, anchor)) = drag.pending.take() else {
            return;
        };
        if !applied {
            return;
        }
        drag.at = drag.at.wrapping_step(dir);
        drag.anchor = anchor;
        drag.shifted = true;
        self.cooldown_until_ms = now_ms + SLIDE_COOLDOWN_MS;
        if matched {
            self.drag = None;
            self.paused_until_ms = now_ms + SLIDE_MATCH_PAUSE_MS;
        }
    }

    /// Pointer released. `None` if no drag was in progress.
    pub fn pointer_up(&mut self) -> Option<DragEnd> {
        let drag = self.drag.take()?;
        Some(if drag.shifted {
            DragEnd::Slid
        } else {
            DragEnd::Tap(drag.at)
        })
    }

    pub fn cancel(&mut self) {
        self.drag = None;
        self.cooldown_until_ms = 0;
        self.paused_until_ms = 0;
    }
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new(GridGeometry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 4x2 tiles starting at (0, 0): tile (x, y) spans cols 4x..4x+3, rows 2y..2y+1.
    fn tracker() -> DragTracker {
        DragTracker::new(GridGeometry::new(0, 0, 4, 2))
    }

    #[test]
    fn test_small_moves_do_nothing() {
        let mut t = tracker();
        assert_eq!(t.pointer_down(9, 4, 0), Some(Coord::new(2, 2)));
        assert_eq!(t.pointer_move(10, 4, 10), None);
        assert!(t.is_dragging());
    }

    #[test]
    fn test_quarter_tile_commits_one_shift() {
        let mut t = tracker();
        t.pointer_down(9, 4, 0);
        let intent = t.pointer_move(11, 4, 10).unwrap();
        assert_eq!(
            intent,
            SlideIntent {
                at: Coord::new(2, 2),
                dir: Direction::Right
            }
        );
        t.slide_result(true, false, 10);
        // Cooldown swallows the next move.
        assert_eq!(t.pointer_move(14, 4, 100), None);
        // Re-armed, and the dragged tile moved one column right.
        let next = t.pointer_move(14, 4, 200).unwrap();
        assert_eq!(next.at, Coord::new(3, 2));
    }

    #[test]
    fn test_rejected_shift_keeps_tile_and_skips_cooldown() {
        let mut t = tracker();
        t.pointer_down(9, 4, 0);
        t.pointer_move(11, 4, 10).unwrap();
        t.slide_result(false, false, 10);

        // Same tile, same direction, asked again right away.
        let again = t.pointer_move(11, 4, 20).unwrap();
        assert_eq!(again.at, Coord::new(2, 2));
        assert_eq!(again.dir, Direction::Right);
        assert_eq!(t.pointer_up(), Some(DragEnd::Tap(Coord::new(2, 2))));
    }

    #[test]
    fn test_vertical_drag() {
        let mut t = tracker();
        t.pointer_down(1, 0, 0);
        let intent = t.pointer_move(1, 1, 5).unwrap();
        assert_eq!(intent.dir, Direction::Down);
        t.slide_result(true, false, 5);
        let up = t.pointer_move(1, 0, 500).unwrap();
        assert_eq!(up.dir, Direction::Up);
        assert_eq!(up.at, Coord::new(0, 1));
    }

    #[test]
    fn test_match_ends_gesture_and_pauses() {
        let mut t = tracker();
        t.pointer_down(9, 4, 0);
        t.pointer_move(12, 4, 10).unwrap();
        t.slide_result(true, true, 10);
        assert!(!t.is_dragging());
        assert_eq!(t.pointer_up(), None);
        assert_eq!(t.pointer_down(9, 4, 500), None);
        assert!(t.pointer_down(9, 4, 1010).is_some());
    }

    #[test]
    fn test_pointer_up_reports_tap_or_slide() {
        let mut t = tracker();
        assert_eq!(t.pointer_up(), None);
        t.pointer_down(0, 0, 0);
        assert_eq!(t.pointer_up(), Some(DragEnd::Tap(Coord::new(0, 0))));
        assert_eq!(t.pointer_move(8, 0, 1000), None);

        t.pointer_down(0, 0, 2000);
        t.pointer_move(2, 0, 2010).unwrap();
        t.slide_result(true, false, 2010);
        assert_eq!(t.pointer_up(), Some(DragEnd::Slid));
    }
}
