//! Leaderboard service and client
//!
//! A small HTTP API that stores finished games and serves the top five
//! scores of each mode, plus the pieces the game uses to talk to it.
//!
//! # Module Structure
//!
//! - [`protocol`]: JSON bodies shared by server and client
//! - [`validate`]: player name filter and submission checks
//! - [`config`]: environment configuration
//! - [`store`]: in-memory and JSON-file score stores
//! - [`server`]: axum router, API key check and rate limiting
//! - [`client`]: hyper client for submit and fetch
//! - [`runtime`]: background link polled by the game loop

pub mod client;
pub mod config;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod store;
pub mod validate;

pub use gemgrid_core as core;
pub use gemgrid_types as types;

pub use client::{ClientError, LeaderboardClient};
pub use config::{ClientConfig, ConfigError, LeaderboardConfig};
pub use protocol::{ErrorBody, Leaderboard, LeaderboardEntry, ScoreRecord, SubmitScoreRequest};
pub use runtime::{LeaderboardLink, LinkEvent};
pub use server::{open_store, router, run_server, serve, AppState, RateLimiter};
pub use store::{JsonFileStore, MemoryStore, ScoreStore, StoreError};
pub use validate::{
    prepare_name, validate_name, validate_submission, NameChoice, NameError, ValidScore,
    ValidationErrors,
};
