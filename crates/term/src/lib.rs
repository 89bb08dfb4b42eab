//! Terminal rendering for the game.
//!
//! A small, game-oriented layer: [`GameView`] draws a snapshot into a
//! [`FrameBuffer`], and [`TerminalRenderer`] flushes frames to the terminal,
//! rewriting only what changed. No widgets, no layout engine.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use gemgrid_core as core;
pub use gemgrid_input as input;
pub use gemgrid_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, HudView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
