//! Authorized API client.
//!
//! Every request carries the stored access token as a bearer. On a 401
//! the client refreshes the pair once and replays the original request
//! once; a second 401 surfaces as-is and a failed refresh drops the
//! local session. The retry never recurses.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

use crate::api::transport::{FetchTransport, HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use crate::auth::storage::{BrowserStorage, TokenStorage};

const DEFAULT_TRAVEL_API_URL: &str = "https://api.tripflow.example.com";
const DEFAULT_AGENTS_API_URL: &str = "https://agents.tripflow.example.com";

/// API error types
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Unauthorized - please log in")]
    Unauthorized,
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Network(err.0)
    }
}

/// An access token and, when the backend rotated one, a refresh token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Some backend deployments wrap payloads in `{status, message, result}`.
fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) => map.remove("result").unwrap_or_else(|| {
            serde_json::Value::Object(map)
        }),
        other => other,
    }
}

fn parse_token_pair(body: &str) -> Result<TokenPair, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    let pair: TokenPair = serde_json::from_value(unwrap_envelope(value))
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    if pair.access_token.is_empty() {
        return Err(ApiError::Deserialization("empty access token".to_string()));
    }
    Ok(pair)
}

/// API client for making authorized HTTP requests
#[derive(Clone)]
pub struct ApiClient<S = BrowserStorage, T = FetchTransport> {
    base_url: String,
    /// Where `/auth/refresh` lives; the agents backend does not issue
    /// tokens, so its client refreshes against the travel backend.
    auth_base_url: String,
    storage: S,
    transport: T,
}

impl ApiClient {
    /// Client for the travel backend.
    pub fn travel() -> Self {
        let base = env_url("TRAVEL_API_URL", DEFAULT_TRAVEL_API_URL);
        Self::with_parts(base.clone(), base, BrowserStorage, FetchTransport)
    }

    /// Client for the agents backend. Same pipeline, different base
    /// address; token issuance stays with the travel backend.
    pub fn agents() -> Self {
        Self::with_parts(
            env_url("AGENTS_API_URL", DEFAULT_AGENTS_API_URL),
            env_url("TRAVEL_API_URL", DEFAULT_TRAVEL_API_URL),
            BrowserStorage,
            FetchTransport,
        )
    }

    /// Client for the same-origin web server (OTP login, logout).
    pub fn web() -> Self {
        Self::with_parts(String::new(), String::new(), BrowserStorage, FetchTransport)
    }
}

impl<S: TokenStorage, T: HttpTransport> ApiClient<S, T> {
    pub fn with_parts(base_url: String, auth_base_url: String, storage: S, transport: T) -> Self {
        Self {
            base_url,
            auth_base_url,
            storage,
            transport,
        }
    }

    /// Make an authorized GET request and deserialize the response
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.request(Method::Get, path, None, true).await
    }

    /// Make an authorized POST request with a JSON body
    pub async fn post<R: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        self.request(Method::Post, path, Some(body), true).await
    }

    /// POST without a bearer token, for endpoints reachable while
    /// logged out.
    pub async fn post_public<R: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        self.request(Method::Post, path, Some(body), false).await
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        authorized: bool,
    ) -> Result<R, ApiError> {
        let mut request = HttpRequest::new(method, format!("{}{}", self.base_url, path));
        request.set_header("Content-Type", "application/json".to_string());
        if authorized {
            if let Some(token) = self.storage.access_token() {
                request.set_header("Authorization", format!("Bearer {token}"));
            }
        }

        let response = self.transport.send(&request).await?;
        if response.status == 401 && authorized {
            let replayed = self.refresh_and_retry(request).await?;
            return parse_body(replayed);
        }
        parse_body(response)
    }

    /// One refresh, one replay. Whatever comes back from the replay is
    /// final; there is no second round.
    async fn refresh_and_retry(&self, mut original: HttpRequest) -> Result<HttpResponse, ApiError> {
        let Some(refresh_token) = self.storage.refresh_token() else {
            self.storage.clear();
            return Err(ApiError::Unauthorized);
        };

        let mut refresh = HttpRequest::new(
            Method::Post,
            format!("{}/auth/refresh", self.auth_base_url),
        );
        refresh.set_header("Content-Type", "application/json".to_string());
        refresh.body = Some(serde_json::json!({ "refreshToken": refresh_token }).to_string());

        let granted = match self.transport.send(&refresh).await {
            Ok(response) if response.ok() => parse_token_pair(&response.body),
            Ok(_) | Err(_) => Err(ApiError::Unauthorized),
        };
        let pair = match granted {
            Ok(pair) => pair,
            Err(_) => {
                // The refresh token is spent or the issuer is unreachable;
                // either way this session is over.
                self.storage.clear();
                return Err(ApiError::Unauthorized);
            }
        };

        self.storage
            .set_tokens(&pair.access_token, pair.refresh_token.as_deref());
        original.set_header("Authorization", format!("Bearer {}", pair.access_token));
        Ok(self.transport.send(&original).await?)
    }
}

#[cfg(test)]
impl<S: TokenStorage, T: HttpTransport> ApiClient<S, T> {
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}

fn parse_body<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ApiError> {
    if !response.ok() {
        return Err(ApiError::Http {
            status: response.status,
            message: response.body,
        });
    }
    // Empty bodies (204s and friends) deserialize as null
    let text = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(text).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Get a base URL from window.ENV or use the default
fn env_url(key: &str, fallback: &str) -> String {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            if let Ok(env) = js_sys::Reflect::get(&window, &JsValue::from_str("ENV")) {
                if !env.is_undefined() {
                    if let Ok(url) = js_sys::Reflect::get(&env, &JsValue::from_str(key)) {
                        if let Some(url) = url.as_string() {
                            return url;
                        }
                    }
                }
            }
        }
    }
    let _ = key;
    fallback.to_string()
}
