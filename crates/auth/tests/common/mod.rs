#![allow(dead_code)]

use std::sync::Arc;

use agora_auth::auth::jwt::TokenConfig;
use agora_auth::auth::password::hash_password;
use agora_auth::router::build_router;
use agora_auth::state::AppState;
use agora_core::memory::{MemorySessionStore, MemoryUserStore};
use agora_core::roles::Role;
use agora_core::store::UserStore;
use agora_core::user::{CreateUser, User};
use agora_web::config::ServerConfig;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub fn token_config() -> TokenConfig {
    TokenConfig {
        secret: "integration-test-secret-long-enough".to_string(),
        access_ttl_mins: 15,
        refresh_ttl_days: 30,
    }
}

/// Router plus direct handles on the stores behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub sessions: Arc<MemorySessionStore>,
}

/// Build the full application router, with the production middleware stack,
/// over fresh in-memory stores.
pub fn build_test_app() -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let state = AppState::new(users.clone(), sessions.clone(), token_config(), true);
    let router = agora_web::server::with_middleware(
        build_router(state.clone()),
        &ServerConfig::default(),
    )
    .unwrap();

    TestApp {
        router,
        state,
        users,
        sessions,
    }
}

/// Insert a user directly into the store, bypassing registration.
pub async fn seed_user(app: &TestApp, email: &str, role: Role) -> User {
    app.users
        .create(CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
            role,
        })
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub struct Call {
    builder: axum::http::request::Builder,
    body: Body,
}

pub fn call(method: Method, uri: &str) -> Call {
    Call {
        builder: Request::builder().method(method).uri(uri),
        body: Body::empty(),
    }
}

impl Call {
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.builder = self.builder.header(CONTENT_TYPE, "application/json");
        self.body = Body::from(value.to_string());
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.builder = self.builder.header(AUTHORIZATION, format!("Bearer {token}"));
        self
    }

    pub fn refresh_cookie(mut self, token: &str) -> Self {
        self.builder = self.builder.header(COOKIE, format!("refresh_token={token}"));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub async fn send(self, app: &TestApp) -> Response<Body> {
        let request = self.builder.body(self.body).unwrap();
        app.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of the `refresh_token` cookie set by `response`, if any.
pub fn set_refresh_cookie(response: &Response<Body>) -> Option<String> {
    let header = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let first = header.split(';').next()?;
    first
        .strip_prefix("refresh_token=")
        .map(str::to_string)
}

/// Log in over HTTP; returns `(access_token, refresh_token)`.
pub async fn login(app: &TestApp, email: &str) -> (String, String) {
    let response = call(Method::POST, "/api/v1/auth/login")
        .header("user-agent", "integration-test")
        .json(serde_json::json!({ "email": email, "password": PASSWORD }))
        .send(app)
        .await;
    assert_eq!(response.status(), 200);
    let refresh = set_refresh_cookie(&response).expect("login must set the refresh cookie");
    let json = body_json(response).await;
    (json["access_token"].as_str().unwrap().to_string(), refresh)
}
