//! Session resolver: hydrates a display-ready identity while a page's
//! initial data is assembled.
//!
//! Runs the same validate/decode/refresh sequence as the gatekeeper but
//! independently; it cannot know whether the gatekeeper already
//! refreshed on this request (they share only the single-flight
//! coordinator and the cookie store). Any refresh it performs is
//! persisted into the returned jar, which the handler must include in
//! its response so later resolutions observe the rotated tokens.

use axum_extra::extract::CookieJar;
use chrono::Utc;
use tracing::debug;

use crate::auth::claims::{decode_unverified, Claims, Session};
use crate::auth::{cookies, AuthState};

/// A resolved identity together with the access token that backs it,
/// for callers that need to hand the token onwards (the same-origin
/// token helper).
pub struct Resolved {
    pub claims: Claims,
    pub access_token: String,
}

/// Resolve the current session from the cookie store.
///
/// `None` means "render as anonymous" and is the outcome of every
/// expected failure: no refresh token, malformed or expired access
/// token that could not be refreshed, refresh rejected. Never errors.
pub async fn resolve(state: &AuthState, jar: CookieJar) -> (Option<Session>, CookieJar) {
    let (resolved, jar) = resolve_with_token(state, jar).await;
    (resolved.map(|r| r.claims.to_session()), jar)
}

pub async fn resolve_with_token(state: &AuthState, jar: CookieJar) -> (Option<Resolved>, CookieJar) {
    let Some(refresh_token) = cookies::refresh_token(&jar) else {
        return (None, jar);
    };

    let now_ms = Utc::now().timestamp_millis();
    if let Some(token) = cookies::access_token(&jar) {
        if let Ok(claims) = decode_unverified(&token) {
            if !claims.is_expired(now_ms) {
                return (
                    Some(Resolved {
                        claims,
                        access_token: token,
                    }),
                    jar,
                );
            }
        }
    }

    match state.refresher.refresh(&refresh_token).await {
        Ok(pair) => {
            let jar = cookies::store_refreshed(jar, &pair, &state.config.cookies);
            match decode_unverified(&pair.access_token) {
                Ok(claims) => (
                    Some(Resolved {
                        claims,
                        access_token: pair.access_token,
                    }),
                    jar,
                ),
                // A pair whose access token does not even decode is
                // useless for rendering; treat like a dead session.
                Err(_) => (None, cookies::clear(jar)),
            }
        }
        Err(err) => {
            debug!(error = %err, "session refresh failed, resolving as anonymous");
            (None, cookies::clear(jar))
        }
    }
}
