//! Gemgrid (workspace facade crate).
//!
//! Re-exports the member crates under `gemgrid::{core,input,leaderboard,term,types}`
//! so binaries, integration tests and benches have one import root.

pub use gemgrid_core as core;
pub use gemgrid_input as input;
pub use gemgrid_leaderboard as leaderboard;
pub use gemgrid_term as term;
pub use gemgrid_types as types;
