//! Structural token decoding for the browser side.
//!
//! Tokens are read only for their payload (identity, role, expiry).
//! Verifying the signature is the travel backend's job; the client
//! treats the claims as advisory and lets a 401 be the final word.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("malformed token")]
pub struct DecodeError;

/// Roles carried in the token's `scope` (or legacy `role`) claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The identity a page needs to render for a logged-in traveler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Payload of an access token. Issuers disagree on which optional
/// claims they populate, so everything beyond `sub`/`exp` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    /// `exp` is seconds since the epoch; the comparison is in millis.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.exp.saturating_mul(1000) <= now_ms
    }

    /// Only a literal ADMIN grant elevates; anything else is a user.
    pub fn resolved_role(&self) -> Role {
        let grant = self.scope.as_deref().or(self.role.as_deref());
        match grant {
            Some("ADMIN") => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone().unwrap_or_else(|| self.sub.clone()),
            email: self.email.clone().unwrap_or_else(|| self.sub.clone()),
            role: self.resolved_role(),
        }
    }
}

/// Decode a token's payload without touching the signature.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|part| !part.is_empty())
        .ok_or(DecodeError)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|_| DecodeError)?;
    serde_json::from_slice(&bytes).map_err(|_| DecodeError)
}

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.not-a-real-signature")
    }

    #[test]
    fn test_decode_reads_payload_and_ignores_signature() {
        let token = fake_token(serde_json::json!({
            "sub": "u-1",
            "exp": 1_900_000_000u64,
            "email": "traveler@example.com",
            "scope": "USER",
        }));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email.as_deref(), Some("traveler@example.com"));
        assert_eq!(claims.resolved_role(), Role::User);
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let claims = decode(&fake_token(serde_json::json!({
            "sub": "u-1",
            "exp": 1_000u64,
        })))
        .unwrap();
        assert!(claims.is_expired(1_000_000));
        assert!(claims.is_expired(1_000_001));
        assert!(!claims.is_expired(999_999));
    }

    #[test]
    fn test_only_literal_admin_elevates() {
        let admin = decode(&fake_token(
            serde_json::json!({"sub": "a", "exp": 1u64, "scope": "ADMIN"}),
        ))
        .unwrap();
        assert!(admin.resolved_role().is_admin());

        let lowercase = decode(&fake_token(
            serde_json::json!({"sub": "a", "exp": 1u64, "scope": "admin"}),
        ))
        .unwrap();
        assert_eq!(lowercase.resolved_role(), Role::User);

        let legacy = decode(&fake_token(
            serde_json::json!({"sub": "a", "exp": 1u64, "role": "ADMIN"}),
        ))
        .unwrap();
        assert!(legacy.resolved_role().is_admin());
    }

    #[test]
    fn test_session_user_falls_back_to_sub() {
        let claims = decode(&fake_token(
            serde_json::json!({"sub": "traveler@example.com", "exp": 1u64}),
        ))
        .unwrap();
        let user = claims.to_session_user();
        assert_eq!(user.id, "traveler@example.com");
        assert_eq!(user.email, "traveler@example.com");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decode("").is_err());
        assert!(decode("no-dots-here").is_err());
        assert!(decode("a..c").is_err());
        assert!(decode("a.!!!.c").is_err());
    }
}
