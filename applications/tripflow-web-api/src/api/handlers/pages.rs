//! Thin page-data handlers.
//!
//! These stand in for the booking UI at its interface boundary: they
//! consume the resolved identity and nothing else. Handlers that
//! resolve a session must return the jar they got back so a refresh
//! performed during resolution is persisted.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::auth::claims::Session;
use crate::auth::{session, AuthState};

#[derive(Serialize)]
pub struct PageData {
    pub page: &'static str,
    /// `None` renders the page as anonymous; never an error.
    pub session: Option<Session>,
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn home(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let (session, jar) = session::resolve(&state, jar).await;
    (
        jar,
        Json(PageData {
            page: "home",
            session,
        }),
    )
        .into_response()
}

pub async fn flights() -> Json<PageData> {
    Json(PageData {
        page: "flights",
        session: None,
    })
}

pub async fn hotels() -> Json<PageData> {
    Json(PageData {
        page: "hotels",
        session: None,
    })
}

pub async fn login() -> Json<PageData> {
    Json(PageData {
        page: "login",
        session: None,
    })
}

pub async fn payment_success() -> Json<PageData> {
    Json(PageData {
        page: "payment-success",
        session: None,
    })
}

pub async fn payment_cancel() -> Json<PageData> {
    Json(PageData {
        page: "payment-cancel",
        session: None,
    })
}

pub async fn profile(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let (session, jar) = session::resolve(&state, jar).await;
    (
        jar,
        Json(PageData {
            page: "profile",
            session,
        }),
    )
        .into_response()
}

pub async fn chat(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let (session, jar) = session::resolve(&state, jar).await;
    (
        jar,
        Json(PageData {
            page: "chat",
            session,
        }),
    )
        .into_response()
}

pub async fn admin_dashboard(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let (session, jar) = session::resolve(&state, jar).await;
    (
        jar,
        Json(PageData {
            page: "admin",
            session,
        }),
    )
        .into_response()
}
