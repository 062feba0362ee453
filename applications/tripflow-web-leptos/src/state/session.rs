//! Session context shared across the component tree.
//!
//! Seeded once at startup from the local token store, updated by the
//! login flow, and dropped whenever the logout event fires anywhere in
//! the app.

use leptos::*;

use crate::auth::claims::{decode, now_ms, SessionUser};
use crate::auth::storage::{BrowserStorage, TokenStorage};

/// Session context containing the signed-in traveler, if any
#[derive(Clone, Copy)]
pub struct SessionContext {
    pub user: ReadSignal<Option<SessionUser>>,
    pub set_user: WriteSignal<Option<SessionUser>>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.user.with(|u| u.is_some())
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .with(|u| u.as_ref().is_some_and(|user| user.role.is_admin()))
    }

    pub fn clear(&self) {
        self.set_user.set(None);
    }
}

/// Read the stored tokens and project an initial session. An expired
/// access token renders as anonymous; the first authorized call will
/// refresh it and the login state catches up from there.
fn initial_session() -> Option<SessionUser> {
    let storage = BrowserStorage;
    storage.refresh_token()?;
    let token = storage.access_token()?;
    let claims = decode(&token).ok()?;
    if claims.is_expired(now_ms()) {
        return None;
    }
    Some(claims.to_session_user())
}

/// Provide session context to the application and subscribe it to the
/// logout broadcast. Call this at the root of the app.
pub fn provide_session_context() {
    let (user, set_user) = create_signal(initial_session());

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::prelude::*;

        if let Some(window) = web_sys::window() {
            let on_logout = Closure::<dyn FnMut()>::new(move || {
                set_user.set(None);
            });
            let _ = window.add_event_listener_with_callback(
                crate::auth::service::LOGOUT_EVENT,
                on_logout.as_ref().unchecked_ref(),
            );
            // The listener lives as long as the page
            on_logout.forget();
        }
    }

    provide_context(SessionContext { user, set_user });
}

/// Hook to access session context
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().expect("SessionContext must be provided by a parent component")
}
