//! Terminal gemgrid runner (default binary).
//!
//! Keyboard and mouse play on a crossterm framebuffer renderer. When
//! `GEMGRID_LB_URL` is set, finished games are submitted under
//! `GEMGRID_PLAYER` and the panel shows the current mode's top scores.

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing_subscriber::EnvFilter;

use gemgrid::core::{
    EngineEvent, FinishedGame, FixedStep, GameSession, GameSnapshot, MoveOutcome, ScoreSink,
};
use gemgrid::input::{
    handle_key_event, handle_mouse_event, should_quit, DragEnd, DragTracker, PointerEvent,
};
use gemgrid::leaderboard::{Leaderboard, LeaderboardLink, LinkEvent};
use gemgrid::term::{FrameBuffer, GameView, HudView, TerminalRenderer, Viewport};
use gemgrid::types::{GameAction, Mode, TICK_MS};

/// Leaderboard refresh period while idle.
const BOARD_REFRESH: Duration = Duration::from_secs(60);

/// Finished games go to the leaderboard link, if any; the last one is kept
/// for the status line.
struct Scoreboard {
    link: Option<LeaderboardLink>,
    last: Option<FinishedGame>,
}

impl ScoreSink for Scoreboard {
    fn hand_off(&mut self, game: FinishedGame) {
        self.last = Some(game);
        if let Some(link) = self.link.as_mut() {
            link.hand_off(game);
        }
    }
}

/// Log to `GEMGRID_LOG_PATH` when set; the terminal belongs to the game.
fn init_tracing() -> Result<()> {
    let Some(path) = std::env::var("GEMGRID_LOG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let link = LeaderboardLink::start_from_env();
    if let Some(link) = &link {
        link.request_fetch();
    }
    let mut session = GameSession::with_entropy(Mode::Simple, Scoreboard { link, last: None })?;

    let view = GameView::default();
    let mut drag = DragTracker::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let mut board = Leaderboard::default();
    let mut board_lines: Vec<String> = Vec::new();
    let mut status: Option<String> = None;

    let started = Instant::now();
    let mut clock = FixedStep::new(TICK_MS);
    clock.advance(0);
    let mut last_fetch = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        drag.set_geometry(view.geometry(viewport));
        session.snapshot_into(&mut snap);
        let hud = HudView {
            cursor: Some(session.cursor()),
            status: status.as_deref(),
            leaderboard: &board_lines,
        };
        view.render_into(&snap, &hud, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let now_ms = started.elapsed().as_millis() as u64;
        let timeout = Duration::from_millis(clock.until_next_ms(now_ms));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        session.apply_action(action)?;
                        match action {
                            GameAction::SetMode(_) | GameAction::NewGame | GameAction::Discard => {
                                drag.cancel();
                                status = None;
                            }
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => match handle_mouse_event(mouse) {
                    Some(PointerEvent::Down { col, row }) => {
                        if session.mode().uses_swaps() {
                            if let Some(at) = drag.geometry().cell_at(col, row) {
                                session.click(at);
                            }
                        } else {
                            drag.pointer_down(col, row, now_ms);
                        }
                    }
                    Some(PointerEvent::Drag { col, row }) => {
                        if let Some(intent) = drag.pointer_move(col, row, now_ms) {
                            let outcome = session.slide(intent.at, intent.dir);
                            drag.slide_result(
                                outcome.applied(),
                                outcome == MoveOutcome::Matched,
                                now_ms,
                            );
                        }
                    }
                    Some(PointerEvent::Up { .. }) => match drag.pointer_up() {
                        Some(DragEnd::Tap(at)) => {
                            session.click(at);
                        }
                        Some(DragEnd::Slid) => {
                            session.check_matches();
                        }
                        None => {}
                    },
                    None => {}
                },
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Fixed-step ticks; a slow frame catches up.
        for _ in 0..clock.advance(started.elapsed().as_millis() as u64) {
            session.tick(TICK_MS)?;
        }

        for event in session.take_events() {
            if let EngineEvent::GameEnded { mode, score } = event {
                tracing::debug!(%mode, score, "game ended");
            }
        }

        if let Some(game) = session.sink_mut().last.take() {
            status = Some(format!("GAME OVER {} pts", game.score));
        }

        if let Some(link) = session.sink_mut().link.as_mut() {
            while let Some(event) = link.try_recv() {
                match event {
                    LinkEvent::Submitted(record) => {
                        status = Some(format!("SAVED {} {}", record.name, record.score));
                    }
                    LinkEvent::SubmitFailed { message, .. } => status = Some(message),
                    LinkEvent::Board(fresh) => board = fresh,
                    LinkEvent::Discarded(_) => status = Some("DISCARDED".to_string()),
                }
            }
            if last_fetch.elapsed() >= BOARD_REFRESH {
                last_fetch = Instant::now();
                link.request_fetch();
            }
        }
        board_lines = board.lines(session.mode());
    }
}
