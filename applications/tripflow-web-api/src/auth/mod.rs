pub mod claims;
pub mod cookies;
pub mod gatekeeper;
pub mod refresh;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use refresh::{RefreshClient, RefreshCoordinator};

/// Shared state for the auth surfaces: configuration, one HTTP client
/// for upstream calls, and the single-flight refresh coordinator that
/// the gatekeeper, the session resolver and the auth handlers all go
/// through.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub refresher: Arc<RefreshCoordinator>,
}

impl AuthState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;
        let refresher = Arc::new(RefreshCoordinator::new(RefreshClient::new(
            http.clone(),
            config.backend.base_url.clone(),
        )));
        Ok(Self {
            config: Arc::new(config),
            http,
            refresher,
        })
    }

    pub fn backend_url(&self, path: &str) -> String {
        format!("{}{}", self.config.backend.base_url, path)
    }
}
