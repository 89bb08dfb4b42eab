//! Game session - mode switching and the game lifecycle
//!
//! A [`GameSession`] owns the current [`ModeEngine`] and replaces it on new
//! game, mode switch, discard and end of game. Finished games with a positive
//! score go to the injected [`ScoreSink`]; the session never talks to the
//! leaderboard itself.

use crate::engine::{ModeEngine, MoveOutcome};
use crate::error::GridError;
use crate::events::EngineEvent;
use crate::rng::TileSource;
use crate::snapshot::GameSnapshot;
use crate::types::{Coord, Direction, GameAction, Mode};

/// What a finished game hands to score submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedGame {
    pub score: u32,
    pub mode: Mode,
    pub peak_multiplier: u32,
    /// Ended by the player rather than by the timer.
    pub manual: bool,
}

/// Receiver for finished games (leaderboard link, test collector, ...).
pub trait ScoreSink {
    fn hand_off(&mut self, game: FinishedGame);
}

impl ScoreSink for Vec<FinishedGame> {
    fn hand_off(&mut self, game: FinishedGame) {
        self.push(game);
    }
}

pub struct GameSession<S: ScoreSink> {
    engine: ModeEngine,
    sink: S,
    seeds: TileSource,
    cursor: Coord,
    /// Events of engines already replaced, not yet drained.
    carried: Vec<EngineEvent>,
    games_started: u32,
}

impl<S: ScoreSink> GameSession<S> {
    /// Start a session; every game's seed derives from `seed`.
    pub fn new(mode: Mode, seed: u64, sink: S) -> Result<Self, GridError> {
        let mut seeds = TileSource::new(seed);
        let mut engine = ModeEngine::new(mode, seeds.next_u64())?;
        engine.start();
        tracing::info!(%mode, seed, "session started");
        Ok(Self {
            engine,
            sink,
            seeds,
            cursor: Coord::new(0, 0),
            carried: Vec::new(),
            games_started: 1,
        })
    }

    /// Session seeded from the OS entropy source.
    pub fn with_entropy(mode: Mode, sink: S) -> Result<Self, GridError> {
        Self::new(mode, TileSource::entropy_seed(), sink)
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    pub fn engine(&self) -> &ModeEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ModeEngine {
        &mut self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    pub fn games_started(&self) -> u32 {
        self.games_started
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine.snapshot()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.engine.snapshot_into(out);
    }

    /// Drain events from the current engine and any it replaced.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        let mut events = std::mem::take(&mut self.carried);
        events.extend(self.engine.take_events());
        events
    }

    /// Replace the engine with a fresh one in `mode`. Any cascade in flight is abandoned.
    pub fn new_game(&mut self, mode: Mode) -> Result<(), GridError> {
        let mut engine = ModeEngine::new(mode, self.seeds.next_u64())?;
        engine.start();
        let old = std::mem::replace(&mut self.engine, engine);
        self.retire(old);
        self.games_started += 1;
        tracing::info!(%mode, seed = self.engine.seed(), "new game");
        Ok(())
    }

    /// Switch modes without submitting anything.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), GridError> {
        self.new_game(mode)
    }

    /// End the current game. A positive score is handed to the sink and
    /// returned; a new game in the same mode starts either way.
    pub fn end_game(&mut self, manual: bool) -> Result<Option<FinishedGame>, GridError> {
        self.engine.end();
        let finished = FinishedGame {
            score: self.engine.score(),
            mode: self.engine.mode(),
            peak_multiplier: self.engine.peak_multiplier(),
            manual,
        };
        let handed = if finished.score > 0 {
            tracing::info!(
                mode = %finished.mode,
                score = finished.score,
                peak_multiplier = finished.peak_multiplier,
                manual,
                "game finished"
            );
            self.sink.hand_off(finished);
            Some(finished)
        } else {
            tracing::debug!(mode = %finished.mode, "game finished without score");
            None
        };
        self.new_game(finished.mode)?;
        Ok(handed)
    }

    /// Throw the current game away, score included.
    pub fn discard(&mut self) -> Result<(), GridError> {
        tracing::info!(mode = %self.mode(), score = self.score(), "game discarded");
        self.new_game(self.mode())
    }

    /// Advance time. A timed game that ran out is finished and replaced here.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<Option<FinishedGame>, GridError> {
        self.engine.tick(elapsed_ms);
        if self.engine.is_ended() {
            return self.end_game(false);
        }
        Ok(None)
    }

    pub fn click(&mut self, at: Coord) -> bool {
        if at.in_bounds() {
            self.cursor = at;
        }
        self.engine.click(at)
    }

    pub fn swap(&mut self, a: Coord, b: Coord) -> MoveOutcome {
        self.engine.try_swap(a, b)
    }

    pub fn slide(&mut self, at: Coord, dir: Direction) -> MoveOutcome {
        self.engine.try_slide(at, dir)
    }

    pub fn check_matches(&mut self) -> bool {
        self.engine.check_matches()
    }

    /// Keyboard-driven control. Returns true if anything changed.
    pub fn apply_action(&mut self, action: GameAction) -> Result<bool, GridError> {
        let changed = match action {
            GameAction::MoveCursor(dir) => match self.cursor.step(dir) {
                Some(next) => {
                    self.cursor = next;
                    true
                }
                None => false,
            },
            GameAction::Select => self.engine.click(self.cursor),
            GameAction::Slide(dir) => {
                let applied = self.engine.try_slide(self.cursor, dir).applied();
                if applied {
                    // Keep the cursor on the tile that moved.
                    self.cursor = self.cursor.wrapping_step(dir);
                }
                applied
            }
            GameAction::NewGame => {
                self.discard()?;
                true
            }
            GameAction::SetMode(mode) => {
                self.set_mode(mode)?;
                true
            }
            GameAction::EndGame => {
                self.end_game(true)?;
                true
            }
            GameAction::Discard => {
                self.discard()?;
                true
            }
        };
        Ok(changed)
    }

    fn retire(&mut self, mut old: ModeEngine) {
        self.carried.extend(old.take_events());
    }
}
