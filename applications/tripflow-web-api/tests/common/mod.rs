#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_test::TestServer;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};

use tripflow_web_api::api::create_router;
use tripflow_web_api::auth::claims::Claims;
use tripflow_web_api::auth::AuthState;
use tripflow_web_api::config::{ApiConfig, BackendConfig, Config, CookieConfig};

/// Mint a signed token the way the travel backend would. The signature
/// key is irrelevant to the code under test, which never verifies it.
pub fn mint(sub: &str, scope: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: sub.to_string(),
        exp: (now + exp_offset_secs) as u64,
        iat: Some(now as u64),
        id: Some(format!("id-{sub}")),
        email: Some(sub.to_string()),
        scope: Some(scope.to_string()),
        role: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"stub-backend-secret"),
    )
    .expect("mint token")
}

#[derive(Clone, Copy)]
pub enum RefreshBehavior {
    Grant { scope: &'static str, rotate: bool },
    Reject,
}

pub struct StubBackend {
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub behavior: Mutex<RefreshBehavior>,
}

impl StubBackend {
    pub fn set_behavior(&self, behavior: RefreshBehavior) {
        *self.behavior.lock().expect("behavior lock") = behavior;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

async fn stub_refresh(State(stub): State<Arc<StubBackend>>) -> (StatusCode, Json<serde_json::Value>) {
    stub.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let behavior = *stub.behavior.lock().expect("behavior lock");
    match behavior {
        RefreshBehavior::Grant { scope, rotate } => {
            let mut result = serde_json::json!({
                "accessToken": mint("traveler@example.com", scope, 3600),
            });
            if rotate {
                result["refreshToken"] = serde_json::json!("rotated-refresh");
            }
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "SUCCESS",
                    "message": "refreshed",
                    "result": result,
                })),
            )
        }
        RefreshBehavior::Reject => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "status": "FAILED", "message": "token revoked" })),
        ),
    }
}

async fn stub_verify(Json(body): Json<serde_json::Value>) -> (StatusCode, Json<serde_json::Value>) {
    let email = body
        .get("email")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let otp = body.get("otp").and_then(|v| v.as_str()).unwrap_or_default();
    if otp == "123456" {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "SUCCESS",
                "message": "verified",
                "result": {
                    "accessToken": mint(&email, "USER", 3600),
                    "refreshToken": "fresh-refresh",
                },
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "status": "FAILED", "message": "invalid OTP" })),
        )
    }
}

/// Spawn a fake travel backend on an ephemeral port.
pub async fn spawn_stub_backend() -> (String, Arc<StubBackend>) {
    let stub = Arc::new(StubBackend {
        refresh_calls: AtomicUsize::new(0),
        logout_calls: AtomicUsize::new(0),
        behavior: Mutex::new(RefreshBehavior::Grant {
            scope: "USER",
            rotate: false,
        }),
    });

    let logout_stub = stub.clone();
    let app = Router::new()
        .route("/auth/refresh", post(stub_refresh))
        .route(
            "/auth/otp-login/verify",
            post(stub_verify),
        )
        .route(
            "/auth/otp-login/{email}",
            post(|| async {
                Json(serde_json::json!({ "status": "SUCCESS", "message": "OTP sent" }))
            }),
        )
        .route(
            "/auth/logout",
            post(move || {
                let stub = logout_stub.clone();
                async move {
                    stub.logout_calls.fetch_add(1, Ordering::SeqCst);
                    // The backend being down or unhappy must not keep a
                    // browser logged in
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }),
        )
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });

    (format!("http://{}", addr), stub)
}

pub fn make_server(backend_url: &str) -> TestServer {
    let config = Config {
        api: ApiConfig::default(),
        backend: BackendConfig {
            base_url: backend_url.to_string(),
            timeout_secs: 5,
        },
        cookies: CookieConfig::default(),
    };
    let state = AuthState::new(config).expect("auth state");
    TestServer::new(create_router(state)).expect("test server")
}
