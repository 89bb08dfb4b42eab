//! Core game logic - pure, deterministic, and testable
//!
//! Everything that decides what happens on the board lives here: the grid,
//! match detection, cascades, specials, scoring and the game lifecycle. No
//! terminal, network or file I/O, so the same code drives the terminal game,
//! headless tests and benchmarks.
//!
//! - **Deterministic**: one seed reproduces a whole session, refills included
//! - **Fixed timestep**: all timers advance only through `tick(elapsed_ms)`
//!
//! # Module Structure
//!
//! - [`grid`]: 8x8 tile matrix, swap, gravity refill, row/column slides
//! - [`matcher`]: run detection over rows and columns
//! - [`rng`]: seeded tile source
//! - [`scoring`]: per-tile points and the combo multiplier
//! - [`engine`]: the per-mode state machine (Simple, Timed, Explosions, Sliders)
//! - [`session`]: new game, mode switch, end of game, discard
//! - [`events`] / [`snapshot`]: what frontends consume
//! - [`clock`]: fixed-step accumulator for real-time loops
//!
//! # Game Rules
//!
//! | Mode       | Move           | Extra                                       |
//! |------------|----------------|---------------------------------------------|
//! | Simple     | swap neighbours| no-match swaps revert after 200ms           |
//! | Timed      | swap neighbours| 300s countdown, game ends at zero           |
//! | Explosions | swap neighbours| bombs (5s fuse, cross blast), line specials |
//! | Sliders    | shift row/col  | wraps around, never reverted                |
//!
//! A cleared tile scores 10 (20 when a special set the step off) times the
//! multiplier. Matches within 5s of each other raise the multiplier by one.
//!
//! # Example
//!
//! ```
//! use gemgrid_core::{GameSession, FinishedGame};
//! use gemgrid_core::types::{Mode, TICK_MS};
//!
//! let mut session = GameSession::new(Mode::Simple, 12345, Vec::<FinishedGame>::new()).unwrap();
//! for _ in 0..10 {
//!     session.tick(TICK_MS).unwrap();
//! }
//! assert_eq!(session.score(), 0);
//! assert!(session.snapshot().playable());
//! ```

pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use gemgrid_types as types;

// Re-export commonly used types for convenience
pub use clock::FixedStep;
pub use engine::{blast_area, ModeEngine, MoveOutcome, Phase};
pub use error::GridError;
pub use events::EngineEvent;
pub use grid::{CoordSet, Grid, Special, Tile};
pub use matcher::{find_matches, find_runs, Run};
pub use rng::TileSource;
pub use scoring::{step_score, tile_points, ComboTracker};
pub use session::{FinishedGame, GameSession, ScoreSink};
pub use snapshot::GameSnapshot;
