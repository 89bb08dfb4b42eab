//! Leaderboard HTTP server.
//!
//! - `GET /` health check
//! - `POST /submit-score` validate and store a score (API key)
//! - `GET /fetch-scores` top scores of every mode (API key)
//!
//! Every route is rate limited per client IP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::LeaderboardConfig;
use crate::protocol::{
    ErrorBody, Leaderboard, LeaderboardEntry, ScoreRecord, SubmitScoreRequest, API_KEY_HEADER,
    TOP_SCORES_PER_MODE,
};
use crate::store::{JsonFileStore, MemoryStore, ScoreStore, StoreError};
use crate::types::Mode;
use crate::validate::validate_submission;

/// Forget idle clients once this many are tracked.
const RATE_TABLE_PRUNE_AT: usize = 4096;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    hits: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request; false once `key` is over the limit for this window.
    pub fn check(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        if hits.len() >= RATE_TABLE_PRUNE_AT {
            let window = self.window;
            hits.retain(|_, w| now.duration_since(w.started) < window);
        }
        let entry = hits.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.limit
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ScoreStore>,
    api_key: Arc<str>,
    limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(cfg: &LeaderboardConfig, store: Arc<dyn ScoreStore>) -> Self {
        Self {
            store,
            api_key: Arc::from(cfg.api_key.as_str()),
            limiter: Arc::new(RateLimiter::new(cfg.rate_limit, cfg.rate_window)),
        }
    }
}

/// Memory store, or a JSON file store when `store_path` is set.
pub fn open_store(cfg: &LeaderboardConfig) -> Result<Arc<dyn ScoreStore>, StoreError> {
    Ok(match &cfg.store_path {
        Some(path) => Arc::new(JsonFileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    })
}

pub fn router(cfg: &LeaderboardConfig, store: Arc<dyn ScoreStore>) -> Router {
    let state = AppState::new(cfg, store);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let scores = Router::new()
        .route(&cfg.submit_path, post(submit_score))
        .route(&cfg.fetch_path, get(fetch_scores))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/", get(health))
        .merge(scores)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(cfg: LeaderboardConfig) -> anyhow::Result<()> {
    let addr = cfg.socket_addr()?;
    let store = open_store(&cfg)?;
    let app = router(&cfg, store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        submit = %cfg.submit_path,
        fetch = %cfg.fetch_path,
        rate_limit = cfg.rate_limit,
        "leaderboard listening"
    );

    serve(listener, app).await?;
    Ok(())
}

/// Serve `app` on an already bound listener until ctrl-c.
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("leaderboard shutting down");
    })
    .await
}

fn error_response(status: StatusCode, errors: Vec<String>) -> Response {
    (status, Json(ErrorBody { errors })).into_response()
}

fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn rate_limit(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    if !st.limiter.check(&client, Instant::now()) {
        tracing::warn!(%client, "rate limit exceeded");
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            vec!["Too many requests, please try again later.".to_string()],
        );
    }
    next.run(req).await
}

async fn require_api_key(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let authorized = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == &*st.api_key);
    if !authorized {
        tracing::warn!(path = %req.uri().path(), "rejected request without valid api key");
        return error_response(StatusCode::UNAUTHORIZED, vec!["Unauthorized".to_string()]);
    }
    next.run(req).await
}

// ═══════════════════════════════════════════════════════════════
// GET /
// ═══════════════════════════════════════════════════════════════

async fn health() -> &'static str {
    "Server is running"
}

// ═══════════════════════════════════════════════════════════════
// POST /submit-score
// ═══════════════════════════════════════════════════════════════

async fn submit_score(
    State(st): State<AppState>,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, vec![rejection.body_text()]);
        }
    };

    let valid = match validate_submission(&req) {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(%errors, "submission rejected");
            return error_response(StatusCode::BAD_REQUEST, errors.0);
        }
    };

    let record = ScoreRecord {
        name: valid.name,
        score: valid.score,
        multiplier: valid.multiplier,
        mode: valid.mode,
        created_at: Utc::now(),
    };

    let store = st.store.clone();
    match tokio::task::spawn_blocking(move || store.insert(record)).await {
        Ok(Ok(saved)) => {
            tracing::info!(name = %saved.name, score = saved.score, mode = %saved.mode, "score stored");
            (StatusCode::CREATED, Json(saved)).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "failed to store score");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, vec!["Server error".to_string()])
        }
        Err(e) => {
            tracing::error!(error = %e, "score store task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, vec!["Server error".to_string()])
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// GET /fetch-scores
// ═══════════════════════════════════════════════════════════════

async fn fetch_scores(State(st): State<AppState>) -> Response {
    let mut board = Leaderboard::default();
    for mode in Mode::ALL {
        match st.store.top(mode, TOP_SCORES_PER_MODE) {
            Ok(records) => {
                *board.for_mode_mut(mode) = records.iter().map(LeaderboardEntry::from).collect();
            }
            Err(e) => {
                tracing::error!(error = %e, %mode, "failed to read scores");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec!["Server error".to_string()],
                );
            }
        }
    }
    (StatusCode::OK, Json(board)).into_response()
}
