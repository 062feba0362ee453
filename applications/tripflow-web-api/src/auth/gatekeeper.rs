//! Edge gatekeeper: runs once per navigation, ahead of any page code.
//!
//! Decides, from the cookie store alone, whether the request carries a
//! session, refreshing the access token when it is missing, malformed
//! or expired, and enforces the path-based access rules. Every cookie
//! mutation decided here is attached to whichever response is finally
//! returned, redirects included, so a refresh is never silently lost.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use tracing::debug;

use crate::auth::claims::{decode_unverified, Role};
use crate::auth::{cookies, AuthState};

pub const LOGIN_PATH: &str = "/login";

/// Disjoint route classes, matched by path prefix. Anything unlisted is
/// public.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    /// Reachable only while logged out (the login page itself).
    LoginOnly,
    /// Requires any valid session.
    User,
    /// Requires the ADMIN role.
    Admin,
}

const USER_PATHS: &[&str] = &["/profile", "/chat"];
const ADMIN_PATHS: &[&str] = &["/admin"];

pub fn classify(path: &str) -> RouteClass {
    if matches_prefix(ADMIN_PATHS, path) {
        RouteClass::Admin
    } else if matches_prefix(USER_PATHS, path) {
        RouteClass::User
    } else if matches_prefix(&[LOGIN_PATH], path) {
        RouteClass::LoginOnly
    } else {
        RouteClass::Public
    }
}

fn matches_prefix(prefixes: &[&str], path: &str) -> bool {
    prefixes
        .iter()
        .any(|p| path == *p || (path.starts_with(p) && path.as_bytes().get(p.len()) == Some(&b'/')))
}

/// Static assets bypass the gatekeeper entirely.
fn is_asset_path(path: &str) -> bool {
    if path.starts_with("/static/") {
        return true;
    }
    matches!(
        path.rsplit_once('.').map(|(_, ext)| ext),
        Some(
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "avif" | "ico" | "css" | "js"
                | "map" | "woff" | "woff2" | "ttf" | "otf" | "json"
        )
    )
}

fn redirect_to_login(requested: &str) -> Redirect {
    // Preserve the intended destination for the post-login return trip
    Redirect::temporary(&format!("{}?next={}", LOGIN_PATH, requested))
}

/// Rewrite the forwarded request's `Cookie` header so downstream
/// session resolutions in the same request observe the rotated tokens
/// instead of re-triggering another refresh. Unrelated cookies are kept.
fn override_request_cookies(request: &mut Request, access: &str, refresh: Option<&str>) {
    let existing = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let mut parts: Vec<String> = existing
        .split(';')
        .map(str::trim)
        .filter(|pair| {
            let name = pair.split('=').next().unwrap_or("");
            name != cookies::ACCESS_TOKEN_COOKIE
                && (refresh.is_none() || name != cookies::REFRESH_TOKEN_COOKIE)
        })
        .filter(|pair| !pair.is_empty())
        .map(str::to_string)
        .collect();
    parts.push(format!("{}={}", cookies::ACCESS_TOKEN_COOKIE, access));
    if let Some(refresh) = refresh {
        parts.push(format!("{}={}", cookies::REFRESH_TOKEN_COOKIE, refresh));
    }

    if let Ok(value) = HeaderValue::from_str(&parts.join("; ")) {
        request.headers_mut().insert(header::COOKIE, value);
    }
}

pub async fn edge_gatekeeper(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_asset_path(&path) {
        return next.run(request).await;
    }
    let class = classify(&path);

    // No refresh token means not logged in, whatever the access cookie says.
    let Some(refresh_token) = cookies::refresh_token(&jar) else {
        return match class {
            RouteClass::User | RouteClass::Admin => redirect_to_login(&path).into_response(),
            _ => next.run(request).await,
        };
    };

    let now_ms = Utc::now().timestamp_millis();
    let fast_path = cookies::access_token(&jar)
        .and_then(|token| decode_unverified(&token).ok())
        .filter(|claims| !claims.is_expired(now_ms));

    let (role, jar) = match fast_path {
        Some(claims) => (claims.resolved_role(), jar),
        None => match state.refresher.refresh(&refresh_token).await {
            Ok(pair) => {
                let role = decode_unverified(&pair.access_token)
                    .map(|claims| claims.resolved_role())
                    .unwrap_or(Role::User);
                override_request_cookies(
                    &mut request,
                    &pair.access_token,
                    pair.refresh_token.as_deref(),
                );
                let jar = cookies::store_refreshed(jar, &pair, &state.config.cookies);
                (role, jar)
            }
            Err(err) => {
                debug!(path = %path, error = %err, "refresh failed, dropping session");
                let jar = cookies::clear(jar);
                return match class {
                    RouteClass::User | RouteClass::Admin => {
                        (jar, redirect_to_login(&path)).into_response()
                    }
                    _ => (jar, next.run(request).await).into_response(),
                };
            }
        },
    };

    match class {
        // Authorization failure, not authentication: the session stays.
        RouteClass::Admin if !role.is_admin() => (jar, Redirect::temporary("/")).into_response(),
        // Logged-in users have no business on the login page.
        RouteClass::LoginOnly => (jar, Redirect::temporary("/")).into_response(),
        _ => (jar, next.run(request).await).into_response(),
    }
}
