use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::api::handlers::{auth, pages};
use crate::auth::{gatekeeper, AuthState};

pub fn create_router(state: AuthState) -> Router {
    // Every navigation passes through the gatekeeper; the route classes
    // themselves live in auth::gatekeeper.
    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/flights", get(pages::flights))
        .route("/hotels", get(pages::hotels))
        .route("/login", get(pages::login))
        .route("/payment/success", get(pages::payment_success))
        .route("/payment/cancel", get(pages::payment_cancel))
        .route("/profile", get(pages::profile))
        .route("/chat", get(pages::chat))
        .route("/admin", get(pages::admin_dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gatekeeper::edge_gatekeeper,
        ));

    // Auth endpoints manage the cookie store themselves and must not be
    // gated (the login call has no session yet by definition).
    let auth_routes = Router::new()
        .route("/auth/otp/send", post(auth::send_otp))
        .route("/auth/otp/verify", post(auth::verify_otp))
        .route("/auth/logout", post(auth::logout))
        .route("/api/auth/token", get(auth::token))
        .route("/api/auth/refresh", post(auth::refresh));

    Router::new()
        .route("/health", get(pages::health))
        .merge(page_routes)
        .merge(auth_routes)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(
                    |_response: &axum::response::Response,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::INFO, latency = ?latency, "request completed");
                    },
                ),
        )
}
