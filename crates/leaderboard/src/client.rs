//! HTTP client for the leaderboard server.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::protocol::{ErrorBody, Leaderboard, ScoreRecord, SubmitScoreRequest, API_KEY_HEADER};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("bad request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("connection failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("reading response failed: {0}")]
    Body(#[from] hyper::Error),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", .0.join(" "))]
    Rejected(Vec<String>),
    #[error("server answered {0}")]
    Status(StatusCode),
}

impl ClientError {
    /// Line shown to the player when a submission did not go through.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected(errors) => errors.join(" "),
            ClientError::Status(status) if *status == StatusCode::TOO_MANY_REQUESTS => {
                "Too many submissions, try again later.".to_string()
            }
            _ => "Could not reach the leaderboard, try again.".to_string(),
        }
    }
}

pub struct LeaderboardClient {
    http: Client<HttpConnector, Full<Bytes>>,
    cfg: ClientConfig,
}

impl LeaderboardClient {
    pub fn new(cfg: ClientConfig) -> Self {
        Self {
            http: Client::builder(TokioExecutor::new()).build_http(),
            cfg,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    pub async fn submit(&self, req: &SubmitScoreRequest) -> Result<ScoreRecord, ClientError> {
        let body = serde_json::to_vec(req)?;
        let request = self
            .request(Method::POST, &self.cfg.submit_url())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(Full::new(Bytes::from(body)))?;
        self.send(request, StatusCode::CREATED).await
    }

    pub async fn fetch(&self) -> Result<Leaderboard, ClientError> {
        let request = self
            .request(Method::GET, &self.cfg.fetch_url())
            .body(Full::new(Bytes::new()))?;
        self.send(request, StatusCode::OK).await
    }

    /// Fetch, falling back to an empty board on any failure.
    pub async fn fetch_or_empty(&self) -> Leaderboard {
        match self.fetch().await {
            Ok(board) => board,
            Err(e) => {
                tracing::warn!(error = %e, "leaderboard fetch failed");
                Leaderboard::default()
            }
        }
    }

    fn request(&self, method: Method, uri: &str) -> hyper::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(API_KEY_HEADER, self.cfg.api_key.as_str())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: Request<Full<Bytes>>,
        expected: StatusCode,
    ) -> Result<T, ClientError> {
        let response = self.http.request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();

        if status == expected {
            return Ok(serde_json::from_slice(&body)?);
        }
        if status == StatusCode::BAD_REQUEST {
            if let Ok(ErrorBody { errors }) = serde_json::from_slice::<ErrorBody>(&body) {
                return Err(ClientError::Rejected(errors));
            }
        }
        Err(ClientError::Status(status))
    }
}
