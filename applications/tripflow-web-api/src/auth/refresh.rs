//! Refresh token exchange against the travel backend.
//!
//! [`RefreshClient`] performs exactly one network call per invocation:
//! any non-success response, timeout, or malformed body is terminal for
//! that session and the caller falls through to unauthenticated. Retry
//! policy lives with the callers, and concurrent callers holding the
//! same refresh token are coalesced by [`RefreshCoordinator`] so the
//! backend never sees the same token consumed twice in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::api::models::auth::{unwrap_envelope, TokenPair};

#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    #[error("refresh rejected with status {0}")]
    Rejected(u16),
    #[error("refresh transport error: {0}")]
    Network(String),
    #[error("malformed refresh response: {0}")]
    Malformed(String),
}

#[derive(Clone)]
pub struct RefreshClient {
    http: reqwest::Client,
    base_url: String,
}

impl RefreshClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Exchange a refresh token for a new access/refresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "refresh rejected by backend");
            return Err(RefreshError::Rejected(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;
        parse_token_pair(body)
    }
}

/// The backend wraps payloads in a `{status, message, result}` envelope
/// but some deployments return the pair bare; accept both.
pub fn parse_token_pair(body: serde_json::Value) -> Result<TokenPair, RefreshError> {
    let payload = unwrap_envelope(body);
    let pair: TokenPair = serde_json::from_value(payload)
        .map_err(|e| RefreshError::Malformed(e.to_string()))?;
    if pair.access_token.is_empty() {
        return Err(RefreshError::Malformed("empty access token".to_string()));
    }
    Ok(pair)
}

type SharedOutcome = Arc<OnceCell<Result<TokenPair, RefreshError>>>;

/// Single-flight wrapper: concurrent navigations that observe the same
/// expired access token share one outstanding refresh call and all see
/// its outcome, instead of racing the backend with a token that may be
/// consumed on first use.
pub struct RefreshCoordinator {
    client: RefreshClient,
    inflight: Mutex<HashMap<String, SharedOutcome>>,
}

impl RefreshCoordinator {
    pub fn new(client: RefreshClient) -> Self {
        Self {
            client,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        let cell = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(refresh_token.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let outcome = cell
            .get_or_init(|| self.client.refresh(refresh_token))
            .await
            .clone();

        // Late arrivals with the same (now consumed) token get a fresh
        // attempt rather than a stale cached pair.
        self.inflight.lock().await.remove(refresh_token);

        outcome
    }
}
