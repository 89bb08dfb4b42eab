//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no behaviour beyond small conversions, so they
//! are usable from the engine, the terminal frontend and the leaderboard wire
//! protocol alike.
//!
//! # Grid Dimensions
//!
//! - **Size**: 8x8 cells, addressed `(x, y)` with `x` the column (0-7, left to
//!   right) and `y` the row (0-7, top to bottom)
//! - **Palette**: 6 tile kinds
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `COMBO_WINDOW_MS` | 5000 | Max gap between matches that still grows the multiplier |
//! | `BOMB_FUSE_MS` | 5000 | Time from flagging a bomb to its detonation |
//! | `AMBIENT_BOMB_INTERVAL_MS` | 15000 | Explosions mode ambient bomb cadence |
//! | `CASCADE_SETTLE_MS` | 500 | Refill settle time between cascade steps |
//! | `SWAP_REVERT_MS` | 200 | Delay before a non-matching swap is undone |
//! | `SLIDE_COOLDOWN_MS` | 150 | Re-arm delay between slides in one drag |
//! | `SLIDE_MATCH_PAUSE_MS` | 1000 | Drag lockout after a slide produced matches |
//!
//! # Examples
//!
//! ```
//! use gemgrid_types::{Coord, Direction, Mode, TileKind, GRID_SIZE};
//!
//! let a = Coord::new(0, 0);
//! assert!(a.is_adjacent(Coord::new(1, 0)));
//! assert!(!a.is_adjacent(Coord::new(1, 1)));
//! assert_eq!(a.step(Direction::Left), None);
//!
//! assert_eq!(Mode::from_str("timed"), Some(Mode::Timed));
//! assert_eq!(Mode::Explosions.as_str(), "EXPLOSIONS");
//!
//! assert_eq!(TileKind::ALL.len(), 6);
//! assert_eq!(GRID_SIZE, 8);
//! ```

use serde::{Deserialize, Serialize};

/// Grid edge length in cells (8x8)
pub const GRID_SIZE: usize = 8;

/// Total number of cells on the grid
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Number of distinct tile kinds in the palette
pub const TILE_KIND_COUNT: usize = 6;

/// Minimum run length that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Points per cleared tile in an ordinary match
pub const BASE_TILE_SCORE: u32 = 10;

/// Points per cleared tile when a bomb or line special fired in the same step
pub const SPECIAL_TILE_SCORE: u32 = 20;

/// Matches closer together than this grow the combo multiplier
pub const COMBO_WINDOW_MS: u64 = 5000;

/// Display clamp for the multiplier (the engine itself is uncapped)
pub const MULTIPLIER_DISPLAY_CAP: u32 = 99;

/// Bomb fuse length
pub const BOMB_FUSE_MS: u64 = 5000;

/// Ambient bomb spawn cadence in Explosions mode
pub const AMBIENT_BOMB_INTERVAL_MS: u64 = 15_000;

/// Upper bound (inclusive) of bombs spawned per ambient wave
pub const AMBIENT_BOMBS_MAX: usize = 2;

/// Chance that a tile in a large match is kept back as a bomb
pub const BOMB_PROMOTION_CHANCE: f64 = 0.3;

/// Smallest match group that can promote bombs
pub const BOMB_PROMOTION_MIN_MATCH: usize = 4;

/// Smallest run that leaves a line special behind
pub const LINE_SPECIAL_MIN_RUN: usize = 5;

/// Timed mode length in seconds
pub const TIMED_DURATION_SECS: u32 = 300;

/// Settle time between two cascade steps
pub const CASCADE_SETTLE_MS: u32 = 500;

/// Delay before a swap that matched nothing is undone
pub const SWAP_REVERT_MS: u32 = 200;

/// Re-arm delay between two slides of one drag gesture
pub const SLIDE_COOLDOWN_MS: u64 = 150;

/// Drag lockout after a slide that produced matches
pub const SLIDE_MATCH_PAUSE_MS: u64 = 1000;

/// Falling tiles travel this many cells per second while settling
pub const FALL_CELLS_PER_SEC: f32 = 16.0;

/// Grid regeneration attempts before initialization is declared failed
pub const MAX_GENERATION_ATTEMPTS: u32 = 10_000;

/// Grid coordinate. `x` is the column, `y` the row (0 at the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Build from signed components, `None` when off the grid.
    pub fn checked(x: i16, y: i16) -> Option<Self> {
        let n = GRID_SIZE as i16;
        if x < 0 || y < 0 || x >= n || y >= n {
            return None;
        }
        Some(Self::new(x as u8, y as u8))
    }

    pub fn in_bounds(&self) -> bool {
        (self.x as usize) < GRID_SIZE && (self.y as usize) < GRID_SIZE
    }

    pub fn manhattan(&self, other: Coord) -> u32 {
        (self.x as i32 - other.x as i32).unsigned_abs()
            + (self.y as i32 - other.y as i32).unsigned_abs()
    }

    /// Manhattan distance of exactly one.
    pub fn is_adjacent(&self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// Neighbour one cell in `dir`, `None` at the edge.
    pub fn step(&self, dir: Direction) -> Option<Coord> {
        let (dx, dy) = dir.delta();
        Self::checked(self.x as i16 + dx as i16, self.y as i16 + dy as i16)
    }

    /// Neighbour one cell in `dir`, wrapping around the grid edge.
    pub fn wrapping_step(&self, dir: Direction) -> Coord {
        let n = GRID_SIZE as i16;
        let (dx, dy) = dir.delta();
        let x = (self.x as i16 + dx as i16).rem_euclid(n);
        let y = (self.y as i16 + dy as i16).rem_euclid(n);
        Self::new(x as u8, y as u8)
    }

    /// Orthogonal neighbours that exist on the grid.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        Direction::ALL.iter().filter_map(move |&d| self.step(d))
    }

    /// Direction from `self` to an adjacent `other`.
    pub fn direction_to(&self, other: Coord) -> Option<Direction> {
        if !self.is_adjacent(other) {
            return None;
        }
        Some(if other.x > self.x {
            Direction::Right
        } else if other.x < self.x {
            Direction::Left
        } else if other.y > self.y {
            Direction::Down
        } else {
            Direction::Up
        })
    }
}

/// Tile colours. The palette is fixed at six kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Red,
    Green,
    Blue,
    Gold,
    Violet,
    Amber,
}

impl TileKind {
    pub const ALL: [TileKind; TILE_KIND_COUNT] = [
        TileKind::Red,
        TileKind::Green,
        TileKind::Blue,
        TileKind::Gold,
        TileKind::Violet,
        TileKind::Amber,
    ];

    /// Palette index wrapped into range.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % TILE_KIND_COUNT]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse tile kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Some(TileKind::Red),
            "green" | "g" => Some(TileKind::Green),
            "blue" | "b" => Some(TileKind::Blue),
            "gold" | "y" => Some(TileKind::Gold),
            "violet" | "v" => Some(TileKind::Violet),
            "amber" | "a" => Some(TileKind::Amber),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Red => "red",
            TileKind::Green => "green",
            TileKind::Blue => "blue",
            TileKind::Gold => "gold",
            TileKind::Violet => "violet",
            TileKind::Amber => "amber",
        }
    }
}

/// Special effect carried by a tile (Explosions mode).
///
/// - **Bomb**: clears itself and its four orthogonal neighbours; also fires on its own once the fuse runs out
/// - **LineH**: clears its whole row when cleared
/// - **LineV**: clears its whole column when cleared
/// - **LineBoth**: clears its row and column when cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialKind {
    Bomb,
    LineH,
    LineV,
    LineBoth,
}

impl SpecialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::Bomb => "bomb",
            SpecialKind::LineH => "lineH",
            SpecialKind::LineV => "lineV",
            SpecialKind::LineBoth => "lineBoth",
        }
    }

    /// Whether this special burns down on its own.
    pub fn has_fuse(&self) -> bool {
        matches!(self, SpecialKind::Bomb)
    }
}

/// Play modes. Wire names are the upper-case strings used by the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Simple,
    Timed,
    Explosions,
    Sliders,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Simple, Mode::Timed, Mode::Explosions, Mode::Sliders];

    /// Parse mode from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SIMPLE" => Some(Mode::Simple),
            "TIMED" => Some(Mode::Timed),
            "EXPLOSIONS" => Some(Mode::Explosions),
            "SLIDERS" => Some(Mode::Sliders),
            _ => None,
        }
    }

    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Simple => "SIMPLE",
            Mode::Timed => "TIMED",
            Mode::Explosions => "EXPLOSIONS",
            Mode::Sliders => "SLIDERS",
        }
    }

    /// Lower-case key used by the leaderboard listing
    pub fn board_key(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Timed => "timed",
            Mode::Explosions => "explosions",
            Mode::Sliders => "sliders",
        }
    }

    /// Sliders replaces swapping with row/column shifts.
    pub fn uses_swaps(&self) -> bool {
        !matches!(self, Mode::Sliders)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen directions. `Down` grows `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Game actions that can be applied to a session
///
/// Keyboard input and scripted drivers both go through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the keyboard cursor one cell
    MoveCursor(Direction),
    /// Select the tile under the cursor (second pick swaps)
    Select,
    /// Sliders: shift the cursor's row or column one step
    Slide(Direction),
    /// Start over in the current mode
    NewGame,
    /// Switch mode (discards progress)
    SetMode(Mode),
    /// Finish the game and hand the score to the leaderboard
    EndGame,
    /// Finish the game without submitting
    Discard,
}

/// A cell on the grid as seen by renderers: kind plus optional special.
pub type CellView = Option<(TileKind, Option<SpecialKind>)>;
