//! OTP login and logout against the same-origin web server.
//!
//! Login and logout each run as a single procedure that keeps the
//! cookie store (written server-side on the same response) and the
//! browser-local store in step. Logout always succeeds locally; the
//! backend call is best effort.

use serde::Deserialize;
use thiserror::Error;

use crate::api::client::{ApiClient, ApiError};
use crate::api::transport::{FetchTransport, HttpTransport};
use crate::auth::claims::SessionUser;
use crate::auth::storage::{BrowserStorage, TokenStorage};

/// DOM event dispatched when the local session ends, so every open
/// piece of UI can drop its signed-in state at once.
pub const LOGOUT_EVENT: &str = "tripflow:logout";

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    access_token: String,
    refresh_token: String,
    user: SessionUser,
}

pub struct AuthService<S: TokenStorage + Clone = BrowserStorage, T: HttpTransport = FetchTransport> {
    client: ApiClient<S, T>,
    storage: S,
}

impl AuthService {
    pub fn new() -> Self {
        Self {
            client: ApiClient::web(),
            storage: BrowserStorage,
        }
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TokenStorage + Clone, T: HttpTransport> AuthService<S, T> {
    pub fn with_parts(client: ApiClient<S, T>, storage: S) -> Self {
        Self { client, storage }
    }

    /// Ask the backend to mail a one-time code to this address.
    pub async fn send_otp(&self, email: &str) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .client
            .post_public(
                "/auth/otp/send",
                &serde_json::json!({ "email": email.trim() }),
            )
            .await?;
        Ok(())
    }

    /// Exchange the code for a token pair. The server response also set
    /// the HTTP-only cookies; this writes the same pair to localStorage
    /// so both stores start a session in agreement.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<SessionUser, AuthError> {
        let granted: VerifyResponse = self
            .client
            .post_public(
                "/auth/otp/verify",
                &serde_json::json!({ "email": email.trim(), "otp": otp.trim() }),
            )
            .await?;
        self.storage
            .set_tokens(&granted.access_token, Some(&granted.refresh_token));
        Ok(granted.user)
    }

    /// End the session. Both local stores are always cleared; the
    /// backend revocation call is not allowed to keep a browser logged
    /// in by failing.
    pub async fn logout(&self) {
        if let Err(err) = self
            .client
            .post_public::<serde_json::Value, _>("/auth/logout", &serde_json::json!({}))
            .await
        {
            log::warn!("logout call failed, clearing local session anyway: {err}");
        }
        self.storage.clear();
        broadcast_logout();
    }
}

fn broadcast_logout() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            if let Ok(event) = web_sys::CustomEvent::new(LOGOUT_EVENT) {
                let _ = window.dispatch_event(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{HttpResponse, ScriptedTransport, TransportError};
    use crate::auth::claims::Role;
    use crate::auth::storage::MemoryStorage;
    use futures::executor::block_on;

    fn service(
        storage: MemoryStorage,
        responses: Vec<Result<HttpResponse, TransportError>>,
    ) -> AuthService<MemoryStorage, ScriptedTransport> {
        let client = ApiClient::with_parts(
            String::new(),
            String::new(),
            storage.clone(),
            ScriptedTransport::new(responses),
        );
        AuthService::with_parts(client, storage)
    }

    #[test]
    fn test_verify_otp_stores_pair_and_returns_user() {
        let storage = MemoryStorage::default();
        let service = service(
            storage.clone(),
            vec![Ok(HttpResponse {
                status: 200,
                body: serde_json::json!({
                    "accessToken": "granted-access",
                    "refreshToken": "granted-refresh",
                    "user": { "id": "u-1", "email": "traveler@example.com", "role": "USER" },
                })
                .to_string(),
            })],
        );

        let user = block_on(service.verify_otp(" traveler@example.com ", "123456")).unwrap();
        assert_eq!(user.email, "traveler@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(storage.access_token().as_deref(), Some("granted-access"));
        assert_eq!(storage.refresh_token().as_deref(), Some("granted-refresh"));
    }

    #[test]
    fn test_verify_otp_failure_stores_nothing() {
        let storage = MemoryStorage::default();
        let service = service(
            storage.clone(),
            vec![Ok(HttpResponse {
                status: 401,
                body: "invalid OTP".to_string(),
            })],
        );

        assert!(block_on(service.verify_otp("t@example.com", "000000")).is_err());
        assert_eq!(storage.access_token(), None);
        assert_eq!(storage.refresh_token(), None);
    }

    #[test]
    fn test_logout_clears_even_when_backend_is_down() {
        let storage = MemoryStorage::with_tokens(Some("a"), Some("r"));
        let service = service(
            storage.clone(),
            vec![Err(TransportError("connection refused".to_string()))],
        );

        block_on(service.logout());
        assert_eq!(storage.access_token(), None);
        assert_eq!(storage.refresh_token(), None);
    }

    #[test]
    fn test_send_otp_trims_address() {
        let storage = MemoryStorage::default();
        let service = service(
            storage,
            vec![Ok(HttpResponse {
                status: 200,
                body: r#"{"status":"SUCCESS"}"#.to_string(),
            })],
        );

        block_on(service.send_otp("  traveler@example.com  ")).unwrap();
        let requests = service.client.transport().requests();
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"email":"traveler@example.com"}"#)
        );
    }
}
