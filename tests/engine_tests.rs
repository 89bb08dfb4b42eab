//! Engine tests - per-mode rules driven through the public API

use gemgrid::core::{ComboTracker, EngineEvent, Grid, ModeEngine, MoveOutcome, Phase};
use gemgrid::types::{
    Coord, Direction, Mode, SpecialKind, TileKind, BOMB_FUSE_MS, GRID_CELLS, GRID_SIZE, TICK_MS,
};
use TileKind::*;

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
    let mut engine = ModeEngine::with_grid(mode, Grid::from_rows(rows), 11);
    engine.start();
    engine
}

/// Explosions engine with its opening bomb wave placed and then defused, so
/// only the bombs a test plants are live.
fn explosions_without_opening_wave(rows: [[TileKind; GRID_SIZE]; GRID_SIZE]) -> ModeEngine {
    let mut engine = started(Mode::Explosions, rows);
    engine.tick(0);
    let opening: Vec<Coord> = engine.grid().specials().map(|(c, _)| c).collect();
    assert!(!opening.is_empty(), "explosions should open with bombs");
    for c in opening {
        engine.grid_mut().get_mut(c).unwrap().special = None;
    }
    engine.take_events();
    engine
}

/// Swapping (2,0) with (2,1) lines up three reds in row 0.
fn three_in_row_setup() -> [[TileKind; GRID_SIZE]; GRID_SIZE] {
    let mut rows = quiet_rows();
    rows[0][1] = Red;
    rows[1][2] = Red;
    rows
}

#[test]
fn test_combo_window() {
    let mut combo = ComboTracker::new();
    assert_eq!(combo.multiplier(), 1);
    assert_eq!(combo.register_match(0), 1);
    assert_eq!(combo.register_match(3000), 2);
    assert_eq!(combo.register_match(9000), 1);
    assert_eq!(combo.peak(), 2);
}

#[test]
fn test_simple_swap_scores_and_compacts() {
    let mut engine = started(Mode::Simple, three_in_row_setup());

    let outcome = engine.try_swap(Coord::new(2, 0), Coord::new(2, 1));
    assert_eq!(outcome, MoveOutcome::Matched);
    assert_eq!(engine.score(), 30);
    assert_eq!(engine.multiplier(), 1);
    assert_eq!(engine.grid().occupied_count(), GRID_CELLS);
    assert_eq!(engine.phase(), Phase::Locked);

    let events = engine.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::TilesCleared { points: 30, special_triggered: false, .. }
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::TilesSpawned { coords } if coords.len() == 3)));
}

#[test]
fn test_cascade_unlocks_eventually() {
    let mut engine = started(Mode::Simple, three_in_row_setup());
    engine.try_swap(Coord::new(2, 0), Coord::new(2, 1));

    let mut elapsed = 0;
    while engine.is_locked() && elapsed < 60_000 {
        engine.tick(TICK_MS);
        elapsed += TICK_MS;
    }
    assert_eq!(engine.phase(), Phase::Active);
    assert_eq!(engine.grid().empty_count(), 0);
    assert!(engine.score() >= 30);
}

#[test]
fn test_no_match_swap_reverts_exactly() {
    let rows = quiet_rows();
    let mut engine = started(Mode::Simple, rows);
    let before = engine.grid().clone();

    let outcome = engine.try_swap(Coord::new(0, 0), Coord::new(1, 0));
    assert_eq!(outcome, MoveOutcome::NoMatch);
    assert!(engine.is_locked());
    assert!(!engine.grid().same_layout(&before));

    // Still locked just before the revert deadline.
    engine.tick(199);
    assert!(engine.is_locked());

    engine.tick(1);
    assert_eq!(engine.phase(), Phase::Active);
    assert!(engine.grid().same_layout(&before));
    assert_eq!(engine.score(), 0);
    assert!(engine
        .take_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::SwapReverted { .. })));
}

#[test]
fn test_moves_rejected_while_locked() {
    let mut engine = started(Mode::Simple, quiet_rows());
    engine.try_swap(Coord::new(0, 0), Coord::new(1, 0));
    assert_eq!(
        engine.try_swap(Coord::new(4, 4), Coord::new(5, 4)),
        MoveOutcome::Rejected
    );
}

#[test]
fn test_bomb_fuse_detonates_cross() {
    let mut engine = explosions_without_opening_wave(quiet_rows());
    assert!(engine.place_special(Coord::new(3, 3), SpecialKind::Bomb));

    while engine.score() == 0 {
        engine.tick(TICK_MS);
        assert!(engine.clock_ms() < BOMB_FUSE_MS + TICK_MS as u64, "bomb never went off");
    }

    assert!(engine.clock_ms() >= BOMB_FUSE_MS);
    // Itself plus four neighbours, 20 points each at multiplier 1.
    assert_eq!(engine.score(), 5 * 20);
    assert_eq!(engine.grid().empty_count(), 0);
    assert!(engine.grid().specials().next().is_none());

    let events = engine.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::Detonated { at, kind: SpecialKind::Bomb } if *at == Coord::new(3, 3)
    )));
}

#[test]
fn test_corner_bomb_clears_three() {
    let mut engine = explosions_without_opening_wave(quiet_rows());
    engine.place_special(Coord::new(0, 0), SpecialKind::Bomb);
    while engine.score() == 0 && engine.clock_ms() < 2 * BOMB_FUSE_MS {
        engine.tick(TICK_MS);
    }
    assert_eq!(engine.score(), 3 * 20);
}

#[test]
fn test_explosions_opens_with_bomb_wave() {
    let mut engine = started(Mode::Explosions, quiet_rows());
    assert_eq!(engine.grid().specials().count(), 0);
    engine.tick(TICK_MS);
    let bombs: Vec<_> = engine.grid().specials().collect();
    assert!((1..=2).contains(&bombs.len()));
    assert!(bombs.iter().all(|(_, s)| s.kind == SpecialKind::Bomb));
}

#[test]
fn test_bomb_caught_in_match_detonates_and_doubles_points() {
    let mut engine = started(Mode::Explosions, three_in_row_setup());
    engine.place_special(Coord::new(1, 0), SpecialKind::Bomb);

    let outcome = engine.try_swap(Coord::new(2, 0), Coord::new(2, 1));
    assert_eq!(outcome, MoveOutcome::Matched);
    // Three matched reds plus (1,1) from the cross, 20 points each.
    assert_eq!(engine.score(), 4 * 20);

    let events = engine.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::Detonated { at, kind: SpecialKind::Bomb } if *at == Coord::new(1, 0)
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::TilesCleared { points: 80, special_triggered: true, coords, .. }
            if coords.len() == 4 && coords.contains(&Coord::new(1, 1))
    )));
}

/// Swapping (2,0) with (2,1) lines up four reds at the start of row 0.
fn four_in_row_setup() -> [[TileKind; GRID_SIZE]; GRID_SIZE] {
    let mut rows = quiet_rows();
    rows[0] = [Red, Red, Gold, Red, Violet, Amber, Red, Green];
    rows[1][2] = Red;
    rows
}

/// Bombs armed by the first resolve step of a four-match, for one seed.
fn promoted_after_four_match(mode: Mode, seed: u64) -> (Vec<Coord>, u32, ModeEngine) {
    let mut engine = ModeEngine::with_grid(mode, Grid::from_rows(four_in_row_setup()), seed);
    engine.start();
    assert_eq!(
        engine.try_swap(Coord::new(2, 0), Coord::new(2, 1)),
        MoveOutcome::Matched
    );
    let armed = engine
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::BombArmed { at, kind: SpecialKind::Bomb } => Some(at),
            _ => None,
        })
        .collect();
    let score = engine.score();
    (armed, score, engine)
}

#[test]
fn test_four_match_promotes_bombs_that_stay_on_board() {
    let mut saw_promotion = false;
    let mut saw_none = false;

    for seed in 0..200 {
        let (armed, score, engine) = promoted_after_four_match(Mode::Explosions, seed);
        assert!(armed.len() <= 4);
        for at in &armed {
            assert_eq!(at.y, 0);
            assert!(at.x < 4);
            let tile = engine.grid().get(*at).unwrap();
            assert_eq!(tile.special_kind(), Some(SpecialKind::Bomb));
        }
        // Promoted tiles are kept, the rest clear at 10 points.
        assert_eq!(score, 10 * (4 - armed.len() as u32));

        saw_promotion |= !armed.is_empty();
        saw_none |= armed.is_empty();
    }
    assert!(saw_promotion && saw_none);

    // Same seed, same promotions.
    assert_eq!(
        promoted_after_four_match(Mode::Explosions, 5).0,
        promoted_after_four_match(Mode::Explosions, 5).0
    );
}

#[test]
fn test_three_match_and_other_modes_never_promote() {
    for seed in 0..50 {
        let (armed, score, _) = promoted_after_four_match(Mode::Simple, seed);
        assert!(armed.is_empty());
        assert_eq!(score, 40);

        let mut engine = ModeEngine::with_grid(
            Mode::Explosions,
            Grid::from_rows(three_in_row_setup()),
            seed,
        );
        engine.start();
        engine.try_swap(Coord::new(2, 0), Coord::new(2, 1));
        assert_eq!(engine.score(), 30);
        assert_eq!(engine.grid().specials().count(), 0);
    }
}

#[test]
fn test_fuse_waits_for_unlock() {
    let mut engine = explosions_without_opening_wave(quiet_rows());
    engine.place_special(Coord::new(5, 5), SpecialKind::Bomb);

    // Lock the board with a no-match swap just before the fuse runs out.
    while engine.clock_ms() + (TICK_MS as u64) < BOMB_FUSE_MS {
        engine.tick(TICK_MS);
    }
    let locked_at = engine.clock_ms();
    assert_eq!(
        engine.try_swap(Coord::new(0, 0), Coord::new(1, 0)),
        MoveOutcome::NoMatch
    );

    while engine.score() == 0 {
        assert!(engine.is_locked(), "unlocked without the bomb going off");
        assert!(engine.grid().get(Coord::new(5, 5)).unwrap().is_special());
        engine.tick(TICK_MS);
    }

    // Revert (200 ms) and detonation land on the same tick.
    assert!(engine.clock_ms() >= locked_at + 200);
    assert_eq!(engine.score(), 5 * 20);
    assert!(engine
        .take_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::Detonated { at, .. } if *at == Coord::new(5, 5))));
}

#[test]
fn test_long_run_promotes_line_special() {
    let mut rows = quiet_rows();
    rows[0] = [Red, Red, Gold, Red, Red, Violet, Amber, Green];
    rows[1][2] = Red;
    let mut engine = started(Mode::Explosions, rows);

    let outcome = engine.try_swap(Coord::new(2, 0), Coord::new(2, 1));
    assert_eq!(outcome, MoveOutcome::Matched);

    let centre = engine.grid().get(Coord::new(2, 0)).unwrap();
    assert_eq!(centre.special_kind(), Some(SpecialKind::LineH));
    assert_eq!(engine.score() % 10, 0);
}

#[test]
fn test_timed_countdown_ends_game() {
    let mut engine = started(Mode::Timed, quiet_rows());
    assert_eq!(engine.time_remaining_secs(), Some(300));

    for _ in 0..299 {
        engine.tick(1000);
    }
    assert_eq!(engine.time_remaining_secs(), Some(1));
    assert!(!engine.is_ended());

    engine.tick(1000);
    assert!(engine.is_ended());
    assert_eq!(engine.time_remaining_secs(), Some(0));
    assert!(engine
        .take_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::GameEnded { mode: Mode::Timed, .. })));
}

#[test]
fn test_untimed_modes_have_no_timer() {
    for mode in [Mode::Simple, Mode::Explosions, Mode::Sliders] {
        let engine = started(mode, quiet_rows());
        assert_eq!(engine.time_remaining_secs(), None);
    }
}

#[test]
fn test_slide_without_match_is_kept() {
    let mut engine = started(Mode::Sliders, quiet_rows());
    let outcome = engine.try_slide(Coord::new(0, 3), Direction::Left);
    assert_eq!(outcome, MoveOutcome::NoMatch);
    assert_eq!(engine.phase(), Phase::Active);

    let after = engine.grid().clone();
    engine.tick(1000);
    assert!(engine.grid().same_layout(&after));
}

#[test]
fn test_slide_with_match_resolves() {
    let mut rows = quiet_rows();
    rows[0] = [Red, Red, Gold, Violet, Amber, Green, Blue, Red];
    let mut engine = started(Mode::Sliders, rows);

    let outcome = engine.try_slide(Coord::new(5, 0), Direction::Right);
    assert_eq!(outcome, MoveOutcome::Matched);
    assert_eq!(engine.score(), 30);
    assert!(engine.is_locked());
}

#[test]
fn test_mode_gating() {
    let mut simple = started(Mode::Simple, quiet_rows());
    assert_eq!(
        simple.try_slide(Coord::new(0, 0), Direction::Left),
        MoveOutcome::Rejected
    );

    let mut sliders = started(Mode::Sliders, quiet_rows());
    assert_eq!(
        sliders.try_swap(Coord::new(0, 0), Coord::new(1, 0)),
        MoveOutcome::Rejected
    );
}

#[test]
fn test_click_selects_then_swaps() {
    let mut engine = started(Mode::Simple, three_in_row_setup());
    assert!(engine.click(Coord::new(2, 0)));
    assert_eq!(engine.selection(), Some(Coord::new(2, 0)));
    assert!(engine.click(Coord::new(2, 1)));
    assert_eq!(engine.selection(), None);
    assert_eq!(engine.score(), 30);
}

#[test]
fn test_snapshot_reflects_state() {
    let mut engine = started(Mode::Timed, three_in_row_setup());
    engine.try_swap(Coord::new(2, 0), Coord::new(2, 1));
    let snap = engine.snapshot();
    assert_eq!(snap.mode, Mode::Timed);
    assert_eq!(snap.score, 30);
    assert_eq!(snap.time_remaining_secs, Some(300));
    assert!(snap.locked());
}
