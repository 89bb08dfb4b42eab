//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key and mouse events into session actions and pointer
//! events, and tracks Sliders drag gestures. Nothing here touches the engine
//! directly; the game loop feeds the results into a `GameSession`.

pub mod drag;
pub mod map;
pub mod pointer;

pub use gemgrid_types as types;

pub use drag::{DragEnd, DragTracker, SlideIntent};
pub use map::{handle_key_event, handle_mouse_event, should_quit};
pub use pointer::{GridGeometry, PointerEvent};
