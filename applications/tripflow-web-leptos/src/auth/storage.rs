//! The browser-local half of the token store.
//!
//! Tokens live in localStorage under `access_token`/`refresh_token`.
//! Earlier releases stored the refresh token under `refreshToken`;
//! reads fall back to that key so existing sessions survive an upgrade,
//! and `clear` removes it so a logout leaves nothing behind.

use gloo_storage::{LocalStorage, Storage};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
const LEGACY_REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Seam over the browser's localStorage so the request pipeline can be
/// exercised on the host.
pub trait TokenStorage {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    /// Stores the new access token, and the refresh token only when the
    /// backend rotated one.
    fn set_tokens(&self, access: &str, refresh: Option<&str>);
    fn clear(&self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl TokenStorage for BrowserStorage {
    fn access_token(&self) -> Option<String> {
        LocalStorage::get(ACCESS_TOKEN_KEY).ok()
    }

    fn refresh_token(&self) -> Option<String> {
        LocalStorage::get(REFRESH_TOKEN_KEY)
            .ok()
            .or_else(|| LocalStorage::get(LEGACY_REFRESH_TOKEN_KEY).ok())
    }

    fn set_tokens(&self, access: &str, refresh: Option<&str>) {
        let _ = LocalStorage::set(ACCESS_TOKEN_KEY, access);
        if let Some(refresh) = refresh {
            let _ = LocalStorage::set(REFRESH_TOKEN_KEY, refresh);
        }
    }

    fn clear(&self) {
        LocalStorage::delete(ACCESS_TOKEN_KEY);
        LocalStorage::delete(REFRESH_TOKEN_KEY);
        LocalStorage::delete(LEGACY_REFRESH_TOKEN_KEY);
    }
}

/// In-memory store for host-side tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: std::rc::Rc<std::cell::RefCell<MemoryInner>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct MemoryInner {
    access: Option<String>,
    refresh: Option<String>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let storage = Self::default();
        storage.inner.borrow_mut().access = access.map(str::to_string);
        storage.inner.borrow_mut().refresh = refresh.map(str::to_string);
        storage
    }
}

#[cfg(test)]
impl TokenStorage for MemoryStorage {
    fn access_token(&self) -> Option<String> {
        self.inner.borrow().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.borrow().refresh.clone()
    }

    fn set_tokens(&self, access: &str, refresh: Option<&str>) {
        let mut inner = self.inner.borrow_mut();
        inner.access = Some(access.to_string());
        if let Some(refresh) = refresh {
            inner.refresh = Some(refresh.to_string());
        }
    }

    fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.access = None;
        inner.refresh = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_without_rotation_keeps_old_refresh_token() {
        let storage = MemoryStorage::with_tokens(Some("old-access"), Some("old-refresh"));
        storage.set_tokens("new-access", None);
        assert_eq!(storage.access_token().as_deref(), Some("new-access"));
        assert_eq!(storage.refresh_token().as_deref(), Some("old-refresh"));
    }

    #[test]
    fn test_set_with_rotation_replaces_both() {
        let storage = MemoryStorage::with_tokens(Some("old-access"), Some("old-refresh"));
        storage.set_tokens("new-access", Some("new-refresh"));
        assert_eq!(storage.refresh_token().as_deref(), Some("new-refresh"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let storage = MemoryStorage::with_tokens(Some("a"), Some("r"));
        storage.clear();
        assert_eq!(storage.access_token(), None);
        assert_eq!(storage.refresh_token(), None);
    }
}
