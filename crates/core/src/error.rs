//! Engine error types.
//!
//! Illegal moves are not errors (they are silently dropped and reported as
//! `false`). The only failure the engine surfaces is an initialization one.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Random regeneration never produced a match-free grid.
    #[error("grid generation found no match-free layout after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
}
