use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an access token issued by the travel backend.
///
/// Decoding here is structural only: the payload segment is parsed, the
/// signature is NOT verified. Anything read from these claims is an
/// authorization hint for routing and rendering; the backend re-checks
/// authorization on every API call it serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Display-ready identity derived from access token claims. Recomputed
/// on every resolution, never cached across navigations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Error)]
#[error("malformed token")]
pub struct DecodeError;

/// Decode a token's claims without verifying its signature.
///
/// Expiry is deliberately not validated here either; callers check it
/// via [`Claims::is_expired`] so that "expired" and "malformed" can be
/// handled through the same refresh path.
pub fn decode_unverified(token: &str) -> Result<Claims, DecodeError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|_| DecodeError)?;
    Ok(data.claims)
}

impl Claims {
    /// Advisory expiry check against a millisecond timestamp.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        (self.exp as i64).saturating_mul(1000) <= now_ms
    }

    /// The backend puts the role either in `scope` or in `role`. Only
    /// the literal `ADMIN` grants admin; everything else is a plain user.
    pub fn resolved_role(&self) -> Role {
        match self.scope.as_deref().or(self.role.as_deref()) {
            Some("ADMIN") => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn to_session(&self) -> Session {
        Session {
            id: self.id.clone().unwrap_or_else(|| self.sub.clone()),
            email: self.email.clone().unwrap_or_else(|| self.sub.clone()),
            role: self.resolved_role(),
        }
    }
}
