//! Leaderboard HTTP server.
//!
//! Configured from `GEMGRID_*` environment variables; `GEMGRID_API_KEY` is
//! required. Log level follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use gemgrid::leaderboard::{run_server, LeaderboardConfig};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = LeaderboardConfig::from_env().context("leaderboard configuration")?;
    tracing::info!(
        host = %cfg.host,
        port = cfg.port,
        store = ?cfg.store_path,
        "leaderboard boot"
    );

    run_server(cfg).await
}
