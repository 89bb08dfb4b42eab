//! Leaderboard server and client configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SUBMIT_PATH: &str = "/submit-score";
pub const DEFAULT_FETCH_PATH: &str = "/fetch-scores";
pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const MIN_RATE_LIMIT: u32 = 50;
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 15 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMGRID_API_KEY must be set")]
    MissingApiKey,
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    /// Requests per client IP per window, within 50..=100.
    pub rate_limit: u32,
    pub rate_window: Duration,
    /// JSON file to persist scores in; memory only when unset.
    pub store_path: Option<PathBuf>,
    pub submit_path: String,
    pub fetch_path: String,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            api_key: String::new(),
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
            store_path: None,
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            fetch_path: DEFAULT_FETCH_PATH.to_string(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    match non_empty(value) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: v }),
    }
}

fn route_path(var: &'static str, value: Option<String>, default: &str) -> Result<String, ConfigError> {
    match non_empty(value) {
        None => Ok(default.to_string()),
        Some(p) if p.starts_with('/') && p.len() > 1 => Ok(p),
        Some(p) => Err(ConfigError::Invalid { var, value: p }),
    }
}

impl LeaderboardConfig {
    /// Config with defaults and the given key, for tests and embedding.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `get_env`, so tests need not touch the
    /// process environment.
    pub fn from_lookup(mut get_env: impl FnMut(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_key = non_empty(get_env("GEMGRID_API_KEY")).ok_or(ConfigError::MissingApiKey)?;
        let host = non_empty(get_env("GEMGRID_LB_HOST")).unwrap_or(defaults.host);
        let port = parse_var("GEMGRID_LB_PORT", get_env("GEMGRID_LB_PORT"))?.unwrap_or(defaults.port);
        let rate_limit = parse_var::<u32>("GEMGRID_RATE_LIMIT", get_env("GEMGRID_RATE_LIMIT"))?
            .unwrap_or(DEFAULT_RATE_LIMIT)
            .clamp(MIN_RATE_LIMIT, DEFAULT_RATE_LIMIT);
        let window_secs = parse_var::<u64>("GEMGRID_RATE_WINDOW_SECS", get_env("GEMGRID_RATE_WINDOW_SECS"))?
            .unwrap_or(DEFAULT_RATE_WINDOW_SECS)
            .max(1);
        let store_path = non_empty(get_env("GEMGRID_STORE_PATH")).map(PathBuf::from);
        let submit_path = route_path("GEMGRID_SUBMIT_PATH", get_env("GEMGRID_SUBMIT_PATH"), DEFAULT_SUBMIT_PATH)?;
        let fetch_path = route_path("GEMGRID_FETCH_PATH", get_env("GEMGRID_FETCH_PATH"), DEFAULT_FETCH_PATH)?;

        Ok(Self {
            host,
            port,
            api_key,
            rate_limit,
            rate_window: Duration::from_secs(window_secs),
            store_path,
            submit_path,
            fetch_path,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            var: "GEMGRID_LB_HOST",
            value: raw,
        })
    }
}

/// Settings for the game's connection to a leaderboard server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://127.0.0.1:3000`, without a trailing slash.
    pub base_url: String,
    pub api_key: String,
    /// Name submitted with finished games.
    pub player: String,
    pub submit_path: String,
    pub fetch_path: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            player: String::new(),
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            fetch_path: DEFAULT_FETCH_PATH.to_string(),
        }
    }

    /// Returns None when `GEMGRID_LB_URL` is unset, which disables the link.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(mut get_env: impl FnMut(&str) -> Option<String>) -> Option<Self> {
        let base_url = non_empty(get_env("GEMGRID_LB_URL"))?;
        let api_key = non_empty(get_env("GEMGRID_API_KEY")).unwrap_or_default();
        let mut cfg = Self::new(base_url, api_key);
        cfg.player = non_empty(get_env("GEMGRID_PLAYER")).unwrap_or_default();
        if let Ok(path) = route_path("GEMGRID_SUBMIT_PATH", get_env("GEMGRID_SUBMIT_PATH"), DEFAULT_SUBMIT_PATH) {
            cfg.submit_path = path;
        }
        if let Ok(path) = route_path("GEMGRID_FETCH_PATH", get_env("GEMGRID_FETCH_PATH"), DEFAULT_FETCH_PATH) {
            cfg.fetch_path = path;
        }
        Some(cfg)
    }

    pub fn submit_url(&self) -> String {
        format!("{}{}", self.base_url, self.submit_path)
    }

    pub fn fetch_url(&self) -> String {
        format!("{}{}", self.base_url, self.fetch_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_api_key_is_required() {
        assert_eq!(
            LeaderboardConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingApiKey)
        );
        assert_eq!(
            LeaderboardConfig::from_lookup(lookup(&[("GEMGRID_API_KEY", "  ")])),
            Err(ConfigError::MissingApiKey)
        );
    }

    #[test]
    fn test_defaults() {
        let cfg = LeaderboardConfig::from_lookup(lookup(&[("GEMGRID_API_KEY", "k")])).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.rate_limit, 100);
        assert_eq!(cfg.rate_window, Duration::from_secs(900));
        assert_eq!(cfg.submit_path, "/submit-score");
        assert_eq!(cfg.fetch_path, "/fetch-scores");
        assert_eq!(cfg.store_path, None);
        assert_eq!(cfg.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_rate_limit_is_clamped() {
        let low = LeaderboardConfig::from_lookup(lookup(&[
            ("GEMGRID_API_KEY", "k"),
            ("GEMGRID_RATE_LIMIT", "10"),
        ]))
        .unwrap();
        assert_eq!(low.rate_limit, 50);

        let high = LeaderboardConfig::from_lookup(lookup(&[
            ("GEMGRID_API_KEY", "k"),
            ("GEMGRID_RATE_LIMIT", "500"),
        ]))
        .unwrap();
        assert_eq!(high.rate_limit, 100);
    }

    #[test]
    fn test_invalid_values() {
        let err = LeaderboardConfig::from_lookup(lookup(&[
            ("GEMGRID_API_KEY", "k"),
            ("GEMGRID_LB_PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "GEMGRID_LB_PORT", .. }));

        let err = LeaderboardConfig::from_lookup(lookup(&[
            ("GEMGRID_API_KEY", "k"),
            ("GEMGRID_SUBMIT_PATH", "scores"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "GEMGRID_SUBMIT_PATH", .. }));
    }

    #[test]
    fn test_client_disabled_without_url() {
        assert_eq!(ClientConfig::from_lookup(lookup(&[("GEMGRID_API_KEY", "k")])), None);
    }

    #[test]
    fn test_client_urls() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("GEMGRID_LB_URL", "http://127.0.0.1:3000/"),
            ("GEMGRID_API_KEY", "k"),
            ("GEMGRID_PLAYER", "ada"),
        ]))
        .unwrap();
        assert_eq!(cfg.submit_url(), "http://127.0.0.1:3000/submit-score");
        assert_eq!(cfg.fetch_url(), "http://127.0.0.1:3000/fetch-scores");
        assert_eq!(cfg.player, "ada");
    }
}
