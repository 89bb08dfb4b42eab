//! Mode engine - the match-3 state machine
//!
//! One [`ModeEngine`] runs any of the four modes; the [`Mode`] tag picks which
//! rules apply at the few points where they differ (swap vs slide, countdown,
//! specials). Everything is driven by player moves and by [`ModeEngine::tick`]
//! with a fixed timestep; all deadlines are compared against the engine clock.
//!
//! Phases:
//!
//! ```text
//! Idle --start--> Active --move with matches--> Locked --stable--> Active
//!                   |                                                |
//!                   +---------------- timer runs out --------------> Ended
//! ```

use serde::Serialize;

use crate::error::GridError;
use crate::events::{EngineEvent, EventLog};
use crate::grid::{CoordSet, Grid, Special};
use crate::matcher::{find_matches, find_runs, Run};
use crate::rng::TileSource;
use crate::scoring::{step_score, ComboTracker};
use crate::snapshot::GameSnapshot;
use crate::types::{
    Coord, Direction, Mode, SpecialKind, AMBIENT_BOMBS_MAX, AMBIENT_BOMB_INTERVAL_MS,
    BOMB_FUSE_MS, BOMB_PROMOTION_CHANCE, BOMB_PROMOTION_MIN_MATCH, CASCADE_SETTLE_MS, GRID_SIZE,
    LINE_SPECIAL_MIN_RUN, SWAP_REVERT_MS, TIMED_DURATION_SECS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Built but not started.
    Idle,
    /// Accepting moves.
    Active,
    /// Resolving a cascade or waiting to revert a swap; moves are ignored.
    Locked,
    /// Timer ran out (or the game was ended); only a new engine continues.
    Ended,
}

/// What a swap or slide did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not allowed right now (wrong phase, wrong mode, bad coordinates).
    Rejected,
    /// Applied, no match. Swaps revert shortly after; slides stay.
    NoMatch,
    /// Applied and a cascade started.
    Matched,
}

impl MoveOutcome {
    pub fn applied(&self) -> bool {
        !matches!(self, MoveOutcome::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Revert { a: Coord, b: Coord, at_ms: u64 },
    Cascade { step: u32, at_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct ModeEngine {
    mode: Mode,
    grid: Grid,
    source: TileSource,
    phase: Phase,
    pending: Pending,
    combo: ComboTracker,
    score: u32,
    clock_ms: u64,
    selection: Option<Coord>,
    /// Whole seconds left (Timed only).
    time_remaining_secs: Option<u32>,
    second_accum_ms: u32,
    next_ambient_ms: u64,
    events: EventLog,
}

impl ModeEngine {
    /// Build an engine with a freshly generated grid.
    pub fn new(mode: Mode, seed: u64) -> Result<Self, GridError> {
        let mut source = TileSource::new(seed);
        let grid = Grid::generate(&mut source, 0)?;
        Ok(Self::assemble(mode, grid, source))
    }

    /// Build an engine around a prepared grid. Refills still draw from `seed`.
    pub fn with_grid(mode: Mode, grid: Grid, seed: u64) -> Self {
        Self::assemble(mode, grid, TileSource::new(seed))
    }

    fn assemble(mode: Mode, grid: Grid, source: TileSource) -> Self {
        Self {
            mode,
            grid,
            source,
            phase: Phase::Idle,
            pending: Pending::None,
            combo: ComboTracker::new(),
            score: 0,
            clock_ms: 0,
            selection: None,
            time_remaining_secs: None,
            second_accum_ms: 0,
            next_ambient_ms: 0,
            events: EventLog::new(),
        }
    }

    /// Start the clock. Calling it again has no effect.
    ///
    /// Explosions opens with a bomb wave on the first tick; later waves
    /// follow every `AMBIENT_BOMB_INTERVAL_MS`.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Active;
        self.next_ambient_ms = self.clock_ms;
        if self.mode == Mode::Timed {
            self.time_remaining_secs = Some(TIMED_DURATION_SECS);
            self.second_accum_ms = 0;
            self.events.push(EngineEvent::TimerTick {
                remaining_secs: TIMED_DURATION_SECS,
            });
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for setting up positions in tests and tools.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn multiplier(&self) -> u32 {
        self.combo.multiplier()
    }

    pub fn peak_multiplier(&self) -> u32 {
        self.combo.peak()
    }

    pub fn time_remaining_secs(&self) -> Option<u32> {
        self.time_remaining_secs
    }

    pub fn selection(&self) -> Option<Coord> {
        self.selection
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn seed(&self) -> u64 {
        self.source.seed()
    }

    /// Drain buffered events, oldest first.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.mode = self.mode;
        out.phase = self.phase;
        out.cells = self.grid.view();
        out.offsets = [[0.0; GRID_SIZE]; GRID_SIZE];
        for (c, tile) in self.grid.tiles() {
            out.offsets[c.y as usize][c.x as usize] = tile.fall_offset;
        }
        out.score = self.score;
        out.multiplier = self.combo.multiplier();
        out.peak_multiplier = self.combo.peak();
        out.time_remaining_secs = self.time_remaining_secs;
        out.selection = self.selection;
        out.clock_ms = self.clock_ms;
        out.seed = self.source.seed();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    /// Selection logic shared by mouse clicks and the keyboard cursor.
    ///
    /// First click selects, clicking the same tile deselects, an adjacent
    /// second click swaps (or slides in Sliders), any other tile moves the
    /// selection. Selecting works while Locked; the move does not.
    pub fn click(&mut self, at: Coord) -> bool {
        if matches!(self.phase, Phase::Idle | Phase::Ended) || !self.grid.is_occupied(at) {
            return false;
        }
        match self.selection {
            None => {
                self.selection = Some(at);
                true
            }
            Some(sel) if sel == at => {
                self.selection = None;
                true
            }
            Some(sel) if sel.is_adjacent(at) => {
                if self.phase == Phase::Locked {
                    return false;
                }
                self.selection = None;
                if self.mode.uses_swaps() {
                    self.try_swap(sel, at).applied()
                } else {
                    match sel.direction_to(at) {
                        Some(dir) => self.try_slide(sel, dir).applied(),
                        None => false,
                    }
                }
            }
            Some(_) => {
                self.selection = Some(at);
                true
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Swap two adjacent tiles. No match schedules a revert; a match starts
    /// the cascade, whose first step resolves before this returns.
    pub fn try_swap(&mut self, a: Coord, b: Coord) -> MoveOutcome {
        if self.phase != Phase::Active || !self.mode.uses_swaps() {
            return MoveOutcome::Rejected;
        }
        if !self.grid.swap(a, b) {
            return MoveOutcome::Rejected;
        }
        self.phase = Phase::Locked;
        if find_matches(&self.grid).is_empty() {
            self.pending = Pending::Revert {
                a,
                b,
                at_ms: self.clock_ms + SWAP_REVERT_MS as u64,
            };
            return MoveOutcome::NoMatch;
        }
        self.resolve_step(1);
        MoveOutcome::Matched
    }

    /// Shift the row or column through `at` one step (Sliders only).
    pub fn try_slide(&mut self, at: Coord, dir: Direction) -> MoveOutcome {
        if self.phase != Phase::Active || self.mode != Mode::Sliders {
            return MoveOutcome::Rejected;
        }
        if !self.grid.slide(at, dir) {
            return MoveOutcome::Rejected;
        }
        self.events.push(EngineEvent::Slid { at, direction: dir });
        if find_matches(&self.grid).is_empty() {
            return MoveOutcome::NoMatch;
        }
        self.phase = Phase::Locked;
        self.resolve_step(1);
        MoveOutcome::Matched
    }

    /// Resolve any matches sitting on the grid. Returns true if a cascade started.
    pub fn check_matches(&mut self) -> bool {
        if self.phase != Phase::Active || find_matches(&self.grid).is_empty() {
            return false;
        }
        self.phase = Phase::Locked;
        self.resolve_step(1);
        true
    }

    /// Flag the tile at `at` as a special. Bombs start their fuse now.
    pub fn place_special(&mut self, at: Coord, kind: SpecialKind) -> bool {
        let now = self.clock_ms;
        let Some(tile) = self.grid.get_mut(at) else {
            return false;
        };
        tile.special = Some(Special {
            kind,
            flagged_at_ms: now,
        });
        self.events.push(EngineEvent::BombArmed { at, kind });
        true
    }

    /// Finish the game. Idempotent.
    pub fn end(&mut self) {
        if self.phase == Phase::Ended {
            return;
        }
        self.phase = Phase::Ended;
        self.pending = Pending::None;
        self.selection = None;
        tracing::info!(mode = %self.mode, score = self.score, "game ended");
        self.events.push(EngineEvent::GameEnded {
            mode: self.mode,
            score: self.score,
        });
    }

    /// Advance the engine clock by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if matches!(self.phase, Phase::Idle | Phase::Ended) {
            return;
        }
        self.clock_ms += elapsed_ms as u64;
        self.grid.settle_offsets(elapsed_ms);

        if self.tick_countdown(elapsed_ms) {
            self.end();
            return;
        }

        if self.combo.decay(self.clock_ms) {
            self.events
                .push(EngineEvent::MultiplierChanged { multiplier: 1 });
        }

        match self.pending {
            Pending::Revert { a, b, at_ms } if self.clock_ms >= at_ms => {
                self.pending = Pending::None;
                self.grid.swap(a, b);
                self.phase = Phase::Active;
                self.events.push(EngineEvent::SwapReverted { a, b });
            }
            Pending::Cascade { step, at_ms } if self.clock_ms >= at_ms => {
                self.pending = Pending::None;
                self.resolve_step(step);
            }
            _ => {}
        }

        if self.mode == Mode::Explosions && self.phase == Phase::Active {
            self.spawn_ambient_bombs();
            self.detonate_expired_fuses();
        }
    }

    /// Returns true when the countdown reached zero.
    fn tick_countdown(&mut self, elapsed_ms: u32) -> bool {
        let Some(mut remaining) = self.time_remaining_secs else {
            return false;
        };
        self.second_accum_ms += elapsed_ms;
        while self.second_accum_ms >= 1000 && remaining > 0 {
            self.second_accum_ms -= 1000;
            remaining -= 1;
            self.events.push(EngineEvent::TimerTick {
                remaining_secs: remaining,
            });
        }
        self.time_remaining_secs = Some(remaining);
        remaining == 0
    }

    /// One cascade step: match, score, clear, refill, schedule the next step.
    fn resolve_step(&mut self, step: u32) {
        let runs = find_runs(&self.grid);
        if runs.is_empty() {
            if self.grid.empty_count() > 0 {
                self.refill();
                self.schedule_step(step);
            } else {
                self.phase = Phase::Active;
            }
            return;
        }

        let before = self.combo.multiplier();
        let multiplier = self.combo.register_match(self.clock_ms);
        if multiplier != before {
            self.events.push(EngineEvent::MultiplierChanged { multiplier });
        }

        let matched: CoordSet = runs.iter().flat_map(Run::coords).collect();
        let keep = if self.mode == Mode::Explosions {
            self.promote_specials(&runs, &matched)
        } else {
            CoordSet::new()
        };

        let mut clear = matched.difference(keep);
        let triggered = self.expand_detonations(&mut clear);
        self.clear_and_refill(clear, triggered, multiplier);
        self.schedule_step(step);
    }

    fn schedule_step(&mut self, finished: u32) {
        self.events
            .push(EngineEvent::CascadeStep { step: finished });
        self.phase = Phase::Locked;
        self.pending = Pending::Cascade {
            step: finished + 1,
            at_ms: self.clock_ms + CASCADE_SETTLE_MS as u64,
        };
    }

    /// Turn match members into specials. Returns the tiles that stay on the board.
    ///
    /// The centre of a run of five or more becomes a line special; when the
    /// step matched at least four tiles, every other plain member may become
    /// a bomb. Tiles that are already special are left to detonate.
    fn promote_specials(&mut self, runs: &[Run], matched: &CoordSet) -> CoordSet {
        let mut keep = CoordSet::new();
        let plain = |grid: &Grid, c: Coord| grid.get(c).is_some_and(|t| !t.is_special());

        for run in runs.iter().filter(|r| r.len >= LINE_SPECIAL_MIN_RUN) {
            let centre = run.centre();
            if keep.contains(centre) || !plain(&self.grid, centre) {
                continue;
            }
            let crossed = runs
                .iter()
                .any(|other| other.horizontal != run.horizontal && other.contains(centre));
            let kind = match (crossed, run.horizontal) {
                (true, _) => SpecialKind::LineBoth,
                (false, true) => SpecialKind::LineH,
                (false, false) => SpecialKind::LineV,
            };
            self.place_special(centre, kind);
            keep.insert(centre);
        }

        if matched.len() >= BOMB_PROMOTION_MIN_MATCH {
            for c in matched.iter() {
                if keep.contains(c) || !plain(&self.grid, c) {
                    continue;
                }
                if self.source.chance(BOMB_PROMOTION_CHANCE) {
                    self.place_special(c, SpecialKind::Bomb);
                    keep.insert(c);
                }
            }
        }

        keep
    }

    /// Grow `clear` by the blast of every special inside it, chaining through
    /// specials caught in a blast. Returns true if anything detonated.
    fn expand_detonations(&mut self, clear: &mut CoordSet) -> bool {
        let mut detonated = CoordSet::new();
        loop {
            let fresh: Vec<(Coord, SpecialKind)> = clear
                .iter()
                .filter(|c| !detonated.contains(*c))
                .filter_map(|c| self.grid.get(c).and_then(|t| t.special_kind()).map(|k| (c, k)))
                .collect();
            if fresh.is_empty() {
                break;
            }
            for (at, kind) in fresh {
                detonated.insert(at);
                *clear = clear.union(blast_area(at, kind));
                tracing::debug!(x = at.x, y = at.y, kind = kind.as_str(), "special detonated");
                self.events.push(EngineEvent::Detonated { at, kind });
            }
        }
        !detonated.is_empty()
    }

    fn clear_and_refill(&mut self, clear: CoordSet, special_triggered: bool, multiplier: u32) {
        let removed = self.grid.clear(&clear);
        let points = step_score(removed, special_triggered, multiplier);
        self.score = self.score.saturating_add(points);
        self.events.push(EngineEvent::TilesCleared {
            coords: clear.iter().collect(),
            points,
            multiplier,
            special_triggered,
        });
        self.refill();
    }

    fn refill(&mut self) {
        let report = self.grid.compact(&mut self.source, self.clock_ms);
        if !report.spawned.is_empty() {
            self.events.push(EngineEvent::TilesSpawned {
                coords: report.spawned.to_vec(),
            });
        }
    }

    fn spawn_ambient_bombs(&mut self) {
        if self.clock_ms < self.next_ambient_ms {
            return;
        }
        self.next_ambient_ms = self.clock_ms + AMBIENT_BOMB_INTERVAL_MS;

        let candidates: Vec<Coord> = self
            .grid
            .tiles()
            .filter(|(_, t)| !t.is_special())
            .map(|(c, _)| c)
            .collect();
        let count = 1 + self.source.next_range(AMBIENT_BOMBS_MAX);
        for at in self.source.pick_distinct(&candidates, count) {
            self.place_special(at, SpecialKind::Bomb);
        }
    }

    fn detonate_expired_fuses(&mut self) {
        let now = self.clock_ms;
        let expired: CoordSet = self
            .grid
            .specials()
            .filter(|(_, s)| s.kind.has_fuse() && now.saturating_sub(s.flagged_at_ms) >= BOMB_FUSE_MS)
            .map(|(c, _)| c)
            .collect();
        if expired.is_empty() {
            return;
        }

        let mut clear = expired;
        self.expand_detonations(&mut clear);
        let multiplier = self.combo.multiplier();
        self.clear_and_refill(clear, true, multiplier);
        self.schedule_step(1);
    }
}

/// Cells a special clears when it goes off.
pub fn blast_area(at: Coord, kind: SpecialKind) -> CoordSet {
    let mut area = CoordSet::new();
    area.insert(at);
    let row = |area: &mut CoordSet| area.extend((0..GRID_SIZE as u8).map(|x| Coord::new(x, at.y)));
    let column =
        |area: &mut CoordSet| area.extend((0..GRID_SIZE as u8).map(|y| Coord::new(at.x, y)));
    match kind {
        SpecialKind::Bomb => area.extend(at.neighbors()),
        SpecialKind::LineH => row(&mut area),
        SpecialKind::LineV => column(&mut area),
        SpecialKind::LineBoth => {
            row(&mut area);
            column(&mut area);
        }
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileKind::{self, *};
    use crate::types::TICK_MS;

    /// Match-free layout: kinds cycle along both axes.
    fn quiet_rows() -> [[TileKind; GRID_SIZE]; GRID_SIZE] {
        let mut rows = [[Red; GRID_SIZE]; GRID_SIZE];
        for (y, row) in rows.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = TileKind::from_index((x + 2 * y) % 6);
            }
        }
        rows
    }

    fn started(mode: Mode, rows: [[TileKind; GRID_SIZE]; GRID_SIZE]) -> ModeEngine {
        let mut engine = ModeEngine::with_grid(mode, Grid::from_rows(rows), 7);
        engine.start();
        engine
    }

    #[test]
    fn test_new_engine_is_idle_and_match_free() {
        let engine = ModeEngine::new(Mode::Simple, 42).unwrap();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(find_matches(engine.grid()).is_empty());
        assert_eq!(engine.multiplier(), 1);
    }

    #[test]
    fn test_click_selection_rules() {
        let mut engine = started(Mode::Simple, quiet_rows());
        let a = Coord::new(2, 2);
        assert!(engine.click(a));
        assert_eq!(engine.selection(), Some(a));
        assert!(engine.click(a));
        assert_eq!(engine.selection(), None);

        engine.click(a);
        engine.click(Coord::new(6, 6));
        assert_eq!(engine.selection(), Some(Coord::new(6, 6)));
    }

    #[test]
    fn test_locked_engine_keeps_selection_but_ignores_swap() {
        let mut engine = started(Mode::Simple, quiet_rows());
        // No-match swap locks until the revert.
        assert_eq!(
            engine.try_swap(Coord::new(0, 0), Coord::new(1, 0)),
            MoveOutcome::NoMatch
        );
        assert!(engine.is_locked());

        assert!(engine.click(Coord::new(4, 4)));
        assert!(!engine.click(Coord::new(5, 4)));
        assert_eq!(engine.selection(), Some(Coord::new(4, 4)));
    }

    #[test]
    fn test_swap_rejected_in_sliders_and_slide_rejected_elsewhere() {
        let mut sliders = started(Mode::Sliders, quiet_rows());
        assert_eq!(
            sliders.try_swap(Coord::new(0, 0), Coord::new(1, 0)),
            MoveOutcome::Rejected
        );
        let mut simple = started(Mode::Simple, quiet_rows());
        assert_eq!(
            simple.try_slide(Coord::new(0, 0), Direction::Left),
            MoveOutcome::Rejected
        );
    }

    #[test]
    fn test_blast_areas() {
        assert_eq!(blast_area(Coord::new(3, 3), SpecialKind::Bomb).len(), 5);
        assert_eq!(blast_area(Coord::new(0, 0), SpecialKind::Bomb).len(), 3);
        assert_eq!(blast_area(Coord::new(2, 5), SpecialKind::LineH).len(), 8);
        assert_eq!(blast_area(Coord::new(2, 5), SpecialKind::LineV).len(), 8);
        assert_eq!(blast_area(Coord::new(2, 5), SpecialKind::LineBoth).len(), 15);
    }

    #[test]
    fn test_chained_detonation() {
        let mut engine = started(Mode::Explosions, quiet_rows());
        engine.place_special(Coord::new(3, 3), SpecialKind::Bomb);
        engine.place_special(Coord::new(4, 3), SpecialKind::LineV);

        let mut clear = CoordSet::new();
        clear.insert(Coord::new(3, 3));
        assert!(engine.expand_detonations(&mut clear));
        // Bomb cross plus all of column 4.
        for y in 0..GRID_SIZE as u8 {
            assert!(clear.contains(Coord::new(4, y)));
        }
        assert!(clear.contains(Coord::new(2, 3)));
    }

    #[test]
    fn test_timed_countdown_ends_game() {
        let mut engine = started(Mode::Timed, quiet_rows());
        assert_eq!(engine.time_remaining_secs(), Some(TIMED_DURATION_SECS));
        engine.tick(1000);
        assert_eq!(engine.time_remaining_secs(), Some(TIMED_DURATION_SECS - 1));
        for _ in 0..TIMED_DURATION_SECS {
            engine.tick(1000);
        }
        assert!(engine.is_ended());
        assert_eq!(engine.time_remaining_secs(), Some(0));
        let events = engine.take_events();
        assert!(matches!(events.last(), Some(EngineEvent::GameEnded { .. })));
    }

    #[test]
    fn test_ended_engine_ignores_input() {
        let mut engine = started(Mode::Simple, quiet_rows());
        engine.end();
        assert!(!engine.click(Coord::new(0, 0)));
        engine.tick(16);
        assert_eq!(engine.clock_ms(), 0);
    }

    #[test]
    fn test_ambient_bombs_open_the_game_then_repeat() {
        let mut engine = started(Mode::Explosions, quiet_rows());
        engine.tick(TICK_MS);
        let opening: Vec<Coord> = engine.grid().specials().map(|(c, _)| c).collect();
        assert!((1..=AMBIENT_BOMBS_MAX).contains(&opening.len()));

        // Defuse the opening wave so nothing goes off before the next one.
        for c in opening {
            engine.grid_mut().get_mut(c).unwrap().special = None;
        }
        engine.tick(AMBIENT_BOMB_INTERVAL_MS as u32 - TICK_MS);
        assert_eq!(engine.grid().specials().count(), 0);
        engine.tick(TICK_MS);
        let bombs = engine.grid().specials().count();
        assert!((1..=AMBIENT_BOMBS_MAX).contains(&bombs));
    }
}
