//! Leaderboard link for the game loop.
//!
//! Bridges the synchronous game loop with the async HTTP client: requests go
//! out over an mpsc channel to a task on a private tokio runtime, results
//! come back on another channel and are polled with [`LeaderboardLink::try_recv`].

use std::collections::VecDeque;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::client::LeaderboardClient;
use crate::config::ClientConfig;
use crate::core::{FinishedGame, ScoreSink};
use crate::protocol::{Leaderboard, ScoreRecord, SubmitScoreRequest};
use crate::validate::{prepare_name, NameChoice, MAX_MULTIPLIER, MAX_SCORE};

/// Outstanding requests before new ones are dropped.
const MAX_PENDING_REQUESTS: usize = 16;

#[derive(Debug, Clone)]
enum LinkCommand {
    Submit(SubmitScoreRequest),
    Fetch,
}

/// Result delivered back to the game loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Submitted(ScoreRecord),
    /// Shown to the player; the request can be sent again.
    SubmitFailed {
        message: String,
        request: Option<SubmitScoreRequest>,
    },
    /// Fresh leaderboard; empty when the server could not be reached.
    Board(Leaderboard),
    /// The configured player name asked for the game to be thrown away.
    Discarded(FinishedGame),
}

/// Running link instance.
pub struct LeaderboardLink {
    _rt: Runtime,
    cmd_tx: mpsc::Sender<LinkCommand>,
    event_rx: mpsc::UnboundedReceiver<LinkEvent>,
    local: VecDeque<LinkEvent>,
    player: String,
}

impl LeaderboardLink {
    /// Start the link from environment variables.
    ///
    /// Returns None if `GEMGRID_LB_URL` is unset or the runtime cannot start.
    pub fn start_from_env() -> Option<Self> {
        let cfg = ClientConfig::from_env()?;
        match Self::start(cfg) {
            Ok(link) => Some(link),
            Err(e) => {
                tracing::error!(error = %e, "leaderboard link failed to start");
                None
            }
        }
    }

    pub fn start(cfg: ClientConfig) -> std::io::Result<Self> {
        let player = cfg.player.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel::<LinkCommand>(MAX_PENDING_REQUESTS);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<LinkEvent>();

        let rt = Runtime::new()?;
        tracing::info!(url = %cfg.base_url, "leaderboard link started");
        rt.spawn(worker(LeaderboardClient::new(cfg), cmd_rx, event_tx));

        Ok(Self {
            _rt: rt,
            cmd_tx,
            event_rx,
            local: VecDeque::new(),
            player,
        })
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn set_player(&mut self, name: impl Into<String>) {
        self.player = name.into();
    }

    /// Queue a submission. False if the queue is full or the worker is gone.
    pub fn submit(&self, req: SubmitScoreRequest) -> bool {
        self.send(LinkCommand::Submit(req))
    }

    /// Ask for a fresh leaderboard; the answer arrives as [`LinkEvent::Board`].
    pub fn request_fetch(&self) -> bool {
        self.send(LinkCommand::Fetch)
    }

    pub fn try_recv(&mut self) -> Option<LinkEvent> {
        self.local
            .pop_front()
            .or_else(|| self.event_rx.try_recv().ok())
    }

    fn send(&self, cmd: LinkCommand) -> bool {
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "leaderboard request dropped");
                false
            }
        }
    }
}

fn request_for(name: String, game: &FinishedGame) -> SubmitScoreRequest {
    let score = game.score.min(MAX_SCORE as u32);
    let multiplier = game.peak_multiplier.clamp(1, MAX_MULTIPLIER as u32);
    SubmitScoreRequest::new(name, score, multiplier, game.mode)
}

impl ScoreSink for LeaderboardLink {
    fn hand_off(&mut self, game: FinishedGame) {
        match prepare_name(&self.player) {
            Ok(NameChoice::Discard) => {
                tracing::info!(mode = %game.mode, score = game.score, "finished game discarded by name");
                self.local.push_back(LinkEvent::Discarded(game));
            }
            Ok(NameChoice::Submit(name)) => {
                let req = request_for(name, &game);
                if !self.submit(req.clone()) {
                    self.local.push_back(LinkEvent::SubmitFailed {
                        message: "Leaderboard busy, try again.".to_string(),
                        request: Some(req),
                    });
                }
            }
            Err(e) => {
                self.local.push_back(LinkEvent::SubmitFailed {
                    message: e.to_string(),
                    request: None,
                });
            }
        }
    }
}

async fn worker(
    client: LeaderboardClient,
    mut cmd_rx: mpsc::Receiver<LinkCommand>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let events = match cmd {
            LinkCommand::Submit(req) => match client.submit(&req).await {
                Ok(record) => {
                    tracing::info!(name = %record.name, score = record.score, "score submitted");
                    vec![
                        LinkEvent::Submitted(record),
                        LinkEvent::Board(client.fetch_or_empty().await),
                    ]
                }
                Err(e) => {
                    tracing::warn!(error = %e, "score submission failed");
                    vec![LinkEvent::SubmitFailed {
                        message: e.user_message(),
                        request: Some(req),
                    }]
                }
            },
            LinkCommand::Fetch => vec![LinkEvent::Board(client.fetch_or_empty().await)],
        };
        for event in events {
            if event_tx.send(event).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    fn game(score: u32, peak: u32) -> FinishedGame {
        FinishedGame {
            score,
            mode: Mode::Explosions,
            peak_multiplier: peak,
            manual: true,
        }
    }

    #[test]
    fn test_request_clamps_multiplier() {
        let req = request_for("ada".to_string(), &game(500, 20_000));
        assert_eq!(req.multiplier, MAX_MULTIPLIER);
        assert_eq!(req.mode, "EXPLOSIONS");
        assert_eq!(req.score, 500);
    }

    #[test]
    fn test_request_clamps_score_into_accepted_range() {
        let req = request_for("ada".to_string(), &game(3_000_000_000, 2));
        assert_eq!(req.score, MAX_SCORE);
        assert!(crate::validate::validate_submission(&req).is_ok());
    }

    #[test]
    fn test_unreachable_server_reports_failure() {
        // Nothing listens on port 9 locally; the worker answers with a failure.
        let mut link = LeaderboardLink::start(ClientConfig::new("http://127.0.0.1:9", "k")).unwrap();
        link.set_player("ada");
        link.hand_off(game(120, 2));

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        let event = loop {
            if let Some(event) = link.try_recv() {
                break event;
            }
            assert!(std::time::Instant::now() < deadline, "no answer from worker");
            std::thread::sleep(std::time::Duration::from_millis(10));
        };
        match event {
            LinkEvent::SubmitFailed { request, .. } => {
                assert_eq!(request.map(|r| r.score), Some(120));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_discard_name_skips_submission() {
        let mut link = LeaderboardLink::start(ClientConfig::new("http://127.0.0.1:9", "k")).unwrap();
        link.set_player("discard");
        link.hand_off(game(120, 2));
        assert_eq!(link.try_recv(), Some(LinkEvent::Discarded(game(120, 2))));
    }

    #[test]
    fn test_bad_name_is_reported_locally() {
        let mut link = LeaderboardLink::start(ClientConfig::new("http://127.0.0.1:9", "k")).unwrap();
        link.set_player("two words");
        link.hand_off(game(120, 2));
        match link.try_recv() {
            Some(LinkEvent::SubmitFailed { message, request }) => {
                assert_eq!(message, "Name cannot contain spaces.");
                assert!(request.is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
