//! Auth passthrough endpoints.
//!
//! Login and logout are single procedures from the browser's point of
//! view: one call writes both token stores (cookies here, local storage
//! on the client from the returned pair), one call clears them. The two
//! `/api/auth/*` helpers expose the cookie-stored token to same-origin
//! scripts that cannot read http-only cookies themselves.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use crate::api::models::auth::{
    envelope_ok, AccessTokenResponse, OtpSendRequest, OtpVerifyRequest, VerifyResponse,
};
use crate::auth::refresh::parse_token_pair;
use crate::auth::{claims, cookies, session, AuthState};
use crate::error::AppError;

/// POST /auth/otp/send - ask the backend to mail a one-time code.
pub async fn send_otp(
    State(state): State<AuthState>,
    Json(payload): Json<OtpSendRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let url = state.backend_url(&format!("/auth/otp-login/{}", payload.email.trim()));
    let response = state.http.post(&url).send().await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamRejected("unable to send OTP".into()));
    }
    let body: serde_json::Value = response.json().await?;
    if !envelope_ok(&body) {
        return Err(AppError::UpstreamRejected(
            body.get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unable to send OTP")
                .to_string(),
        ));
    }
    Ok(Json(body))
}

/// POST /auth/otp/verify - exchange the code for a token pair.
///
/// On success both cookies are written here and the pair is returned to
/// the browser so it can populate its local store from the same call.
pub async fn verify_otp(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<OtpVerifyRequest>,
) -> Result<Response, AppError> {
    let url = state.backend_url("/auth/otp-login/verify");
    let response = state
        .http
        .post(&url)
        .json(&serde_json::json!({
            "email": payload.email.trim(),
            "otp": payload.otp.trim(),
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamRejected("OTP verification failed".into()));
    }
    let body: serde_json::Value = response.json().await?;
    if !envelope_ok(&body) {
        return Err(AppError::UpstreamRejected(
            body.get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("OTP verification failed")
                .to_string(),
        ));
    }

    let pair = parse_token_pair(body)
        .map_err(|e| AppError::UpstreamRejected(format!("token payload missing: {e}")))?;
    let refresh_token = pair
        .refresh_token
        .clone()
        .ok_or_else(|| AppError::UpstreamRejected("login response without refresh token".into()))?;
    let user = claims::decode_unverified(&pair.access_token)
        .map_err(|_| AppError::UpstreamRejected("login returned a malformed access token".into()))?
        .to_session();

    debug!(email = %payload.email, "login verified, session established");
    let jar = cookies::store_login(jar, &pair.access_token, &refresh_token, &state.config.cookies);
    Ok((
        jar,
        Json(VerifyResponse {
            access_token: pair.access_token,
            refresh_token,
            user,
        }),
    )
        .into_response())
}

/// POST /auth/logout - best-effort upstream invalidation, then clear
/// both cookies. Upstream failures are logged, never surfaced; the
/// local session dies regardless.
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let url = state.backend_url("/auth/logout");
    let mut request = state.http.post(&url);
    if let Some(token) = cookies::access_token(&jar) {
        request = request.bearer_auth(token);
    }
    match request.send().await {
        Ok(response) if !response.status().is_success() => {
            warn!(status = response.status().as_u16(), "backend logout rejected");
        }
        Err(err) => warn!(error = %err, "backend logout unreachable"),
        Ok(_) => {}
    }

    let jar = cookies::clear(jar);
    (jar, StatusCode::NO_CONTENT).into_response()
}

/// GET /api/auth/token - same-origin helper handing a valid (fresh or
/// freshly refreshed) access token to browser code.
pub async fn token(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let (resolved, jar) = session::resolve_with_token(&state, jar).await;
    match resolved {
        Some(resolved) => (
            jar,
            Json(AccessTokenResponse {
                access_token: resolved.access_token,
            }),
        )
            .into_response(),
        None => (jar, StatusCode::UNAUTHORIZED).into_response(),
    }
}

/// POST /api/auth/refresh - refresh the cookie pair on behalf of a
/// same-origin script and hand back the new access token.
pub async fn refresh(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let Some(refresh_token) = cookies::refresh_token(&jar) else {
        return (cookies::clear(jar), StatusCode::UNAUTHORIZED).into_response();
    };
    match state.refresher.refresh(&refresh_token).await {
        Ok(pair) => {
            let jar = cookies::store_refreshed(jar, &pair, &state.config.cookies);
            (
                jar,
                Json(AccessTokenResponse {
                    access_token: pair.access_token,
                }),
            )
                .into_response()
        }
        Err(err) => {
            debug!(error = %err, "helper refresh failed");
            (cookies::clear(jar), StatusCode::UNAUTHORIZED).into_response()
        }
    }
}
