use serde::Serialize;

use crate::engine::Phase;
use crate::types::{CellView, Coord, Mode, GRID_SIZE};

/// Plain-data copy of everything a frontend draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub mode: Mode,
    pub phase: Phase,
    /// `cells[y][x]`
    pub cells: [[CellView; GRID_SIZE]; GRID_SIZE],
    /// Fall offsets in cells, `offsets[y][x]`; 0 at rest.
    pub offsets: [[f32; GRID_SIZE]; GRID_SIZE],
    pub score: u32,
    pub multiplier: u32,
    pub peak_multiplier: u32,
    pub time_remaining_secs: Option<u32>,
    pub selection: Option<Coord>,
    pub clock_ms: u64,
    pub seed: u64,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.mode = Mode::Simple;
        self.phase = Phase::Idle;
        self.cells = [[None; GRID_SIZE]; GRID_SIZE];
        self.offsets = [[0.0; GRID_SIZE]; GRID_SIZE];
        self.score = 0;
        self.multiplier = 1;
        self.peak_multiplier = 1;
        self.time_remaining_secs = None;
        self.selection = None;
        self.clock_ms = 0;
        self.seed = 0;
    }

    pub fn locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    pub fn playable(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Multiplier as shown to the player.
    pub fn display_multiplier(&self) -> u32 {
        self.multiplier.min(crate::types::MULTIPLIER_DISPLAY_CAP)
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            mode: Mode::Simple,
            phase: Phase::Idle,
            cells: [[None; GRID_SIZE]; GRID_SIZE],
            offsets: [[0.0; GRID_SIZE]; GRID_SIZE],
            score: 0,
            multiplier: 1,
            peak_multiplier: 1,
            time_remaining_secs: None,
            selection: None,
            clock_ms: 0,
            seed: 0,
        };
        s.clear();
        s
    }
}
