//! Scoring module - per-tile points and the combo multiplier
//!
//! A cleared tile is worth [`BASE_TILE_SCORE`], or [`SPECIAL_TILE_SCORE`] when
//! the step that cleared it was set off by a special, times the current
//! multiplier. The multiplier climbs by one for every match that resolves
//! within [`COMBO_WINDOW_MS`] of the previous one and falls back to 1 otherwise.

use crate::types::{BASE_TILE_SCORE, COMBO_WINDOW_MS, SPECIAL_TILE_SCORE};

/// Points for one cleared tile before the multiplier.
pub fn tile_points(special_triggered: bool) -> u32 {
    if special_triggered {
        SPECIAL_TILE_SCORE
    } else {
        BASE_TILE_SCORE
    }
}

/// Score for one resolve step.
pub fn step_score(cleared: usize, special_triggered: bool, multiplier: u32) -> u32 {
    (cleared as u32)
        .saturating_mul(tile_points(special_triggered))
        .saturating_mul(multiplier)
}

/// Combo multiplier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboTracker {
    multiplier: u32,
    last_match_ms: Option<u64>,
    peak: u32,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self {
            multiplier: 1,
            last_match_ms: None,
            peak: 1,
        }
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn peak(&self) -> u32 {
        self.peak
    }

    pub fn last_match_ms(&self) -> Option<u64> {
        self.last_match_ms
    }

    /// Record a match resolving at `now_ms`. Returns the multiplier to score it with.
    pub fn register_match(&mut self, now_ms: u64) -> u32 {
        self.multiplier = match self.last_match_ms {
            Some(last) if now_ms.saturating_sub(last) <= COMBO_WINDOW_MS => {
                self.multiplier.saturating_add(1)
            }
            _ => 1,
        };
        self.last_match_ms = Some(now_ms);
        self.peak = self.peak.max(self.multiplier);
        self.multiplier
    }

    /// Drop back to 1 once the window has passed. Returns true if it changed.
    pub fn decay(&mut self, now_ms: u64) -> bool {
        let Some(last) = self.last_match_ms else {
            return false;
        };
        if self.multiplier > 1 && now_ms.saturating_sub(last) > COMBO_WINDOW_MS {
            self.multiplier = 1;
            return true;
        }
        false
    }
}

impl Default for ComboTracker {
    fn default() -> Self {
        Self::new()
    }
}
