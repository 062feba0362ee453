//! Cookie-backed token store.
//!
//! Both tokens live in http-only cookies scoped to the whole site so
//! server-executed code (the gatekeeper and the session resolver) can
//! read them while page scripts cannot. Writes and clears always touch
//! the pair together; a half-written store is worse than no store.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::api::models::auth::TokenPair;
use crate::config::CookieConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

pub fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string())
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string())
}

fn build(name: &'static str, value: String, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(ttl_secs))
        .build()
}

/// Write a freshly issued pair after login. Both cookies are always set.
pub fn store_login(
    jar: CookieJar,
    access_token: &str,
    refresh_token: &str,
    cfg: &CookieConfig,
) -> CookieJar {
    jar.add(build(
        ACCESS_TOKEN_COOKIE,
        access_token.to_string(),
        cfg.access_ttl_secs,
    ))
    .add(build(
        REFRESH_TOKEN_COOKIE,
        refresh_token.to_string(),
        cfg.refresh_ttl_secs,
    ))
}

/// Write the outcome of a refresh. The refresh cookie is only replaced
/// when the backend rotated it; otherwise the stored one stays as-is.
pub fn store_refreshed(jar: CookieJar, pair: &TokenPair, cfg: &CookieConfig) -> CookieJar {
    let jar = jar.add(build(
        ACCESS_TOKEN_COOKIE,
        pair.access_token.clone(),
        cfg.access_ttl_secs,
    ));
    match &pair.refresh_token {
        Some(rotated) => jar.add(build(
            REFRESH_TOKEN_COOKIE,
            rotated.clone(),
            cfg.refresh_ttl_secs,
        )),
        None => jar,
    }
}

/// Remove both cookies. Used by logout and by every terminal refresh
/// failure (which is treated as an implicit logout).
pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/"))
        .remove(Cookie::build((REFRESH_TOKEN_COOKIE, "")).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CookieConfig {
        CookieConfig::default()
    }

    #[test]
    fn test_login_writes_both_cookies() {
        let jar = store_login(CookieJar::new(), "acc-1", "ref-1", &cfg());
        assert_eq!(access_token(&jar).as_deref(), Some("acc-1"));
        assert_eq!(refresh_token(&jar).as_deref(), Some("ref-1"));

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_refresh_without_rotation_keeps_refresh_cookie() {
        let jar = store_login(CookieJar::new(), "acc-1", "ref-1", &cfg());
        let pair = TokenPair {
            access_token: "acc-2".into(),
            refresh_token: None,
        };
        let jar = store_refreshed(jar, &pair, &cfg());
        assert_eq!(access_token(&jar).as_deref(), Some("acc-2"));
        assert_eq!(refresh_token(&jar).as_deref(), Some("ref-1"));
    }

    #[test]
    fn test_refresh_with_rotation_replaces_both() {
        let jar = store_login(CookieJar::new(), "acc-1", "ref-1", &cfg());
        let pair = TokenPair {
            access_token: "acc-2".into(),
            refresh_token: Some("ref-2".into()),
        };
        let jar = store_refreshed(jar, &pair, &cfg());
        assert_eq!(access_token(&jar).as_deref(), Some("acc-2"));
        assert_eq!(refresh_token(&jar).as_deref(), Some("ref-2"));
    }

    #[test]
    fn test_clear_removes_both_cookies() {
        let jar = store_login(CookieJar::new(), "acc-1", "ref-1", &cfg());
        let jar = clear(jar);
        assert_eq!(access_token(&jar), None);
        assert_eq!(refresh_token(&jar), None);
    }
}
