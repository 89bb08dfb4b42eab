//! Wire types for the leaderboard HTTP API.
//!
//! JSON field names follow the browser client that shares the server:
//! `createdAt` in camelCase, modes as upper-case strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Mode;

/// Scores returned per mode by `GET /fetch-scores`.
pub const TOP_SCORES_PER_MODE: usize = 5;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Body of `POST /submit-score`.
///
/// Kept loose (numbers as i64, mode as a string) so that out-of-range values
/// reach validation and come back as readable messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitScoreRequest {
    #[serde(default)]
    pub name: String,
    pub score: i64,
    pub multiplier: i64,
    pub mode: String,
}

impl SubmitScoreRequest {
    pub fn new(name: impl Into<String>, score: u32, multiplier: u32, mode: Mode) -> Self {
        Self {
            name: name.into(),
            score: i64::from(score),
            multiplier: i64::from(multiplier),
            mode: mode.as_str().to_string(),
        }
    }
}

/// A stored score, as returned with `201 Created`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub name: String,
    pub score: u32,
    pub multiplier: u32,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
}

impl From<&ScoreRecord> for LeaderboardEntry {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            name: record.name.clone(),
            score: record.score,
            mode: record.mode,
            created_at: record.created_at,
        }
    }
}

/// Body of `GET /fetch-scores`: top scores keyed by lower-case mode name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leaderboard {
    pub simple: Vec<LeaderboardEntry>,
    pub timed: Vec<LeaderboardEntry>,
    pub explosions: Vec<LeaderboardEntry>,
    pub sliders: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn for_mode(&self, mode: Mode) -> &[LeaderboardEntry] {
        match mode {
            Mode::Simple => &self.simple,
            Mode::Timed => &self.timed,
            Mode::Explosions => &self.explosions,
            Mode::Sliders => &self.sliders,
        }
    }

    pub fn for_mode_mut(&mut self, mode: Mode) -> &mut Vec<LeaderboardEntry> {
        match mode {
            Mode::Simple => &mut self.simple,
            Mode::Timed => &mut self.timed,
            Mode::Explosions => &mut self.explosions,
            Mode::Sliders => &mut self.sliders,
        }
    }

    pub fn is_empty(&self) -> bool {
        Mode::ALL.iter().all(|m| self.for_mode(*m).is_empty())
    }

    /// `"1. name  score"` lines for one mode, for the terminal panel.
    pub fn lines(&self, mode: Mode) -> Vec<String> {
        self.for_mode(mode)
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {:<16} {}", i + 1, e.name, e.score))
            .collect()
    }
}

/// Error body for 400/401/429/500 responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

impl ErrorBody {
    pub fn single(msg: impl Into<String>) -> Self {
        Self {
            errors: vec![msg.into()],
        }
    }
}
