#![allow(dead_code)]

use std::sync::Arc;

use agora_auth::auth::jwt::{TokenConfig, TokenManager};
use agora_auth::verify::LocalVerifier;
use agora_chat::router::build_router;
use agora_chat::state::AppState;
use agora_chat::ws::Hub;
use agora_core::chat::{Category, CreateCategory, CreateTopic, Topic};
use agora_core::memory::{MemoryCategoryStore, MemoryMessageStore, MemoryTopicStore};
use agora_core::roles::Role;
use agora_core::store::{CategoryStore, TopicStore};
use agora_core::types::DbId;
use agora_web::config::ServerConfig;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const ADMIN_ID: DbId = 1;
pub const ALICE_ID: DbId = 10;
pub const BOB_ID: DbId = 11;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub hub: Arc<Hub>,
    pub tokens: Arc<TokenManager>,
    pub categories: Arc<MemoryCategoryStore>,
    pub topics: Arc<MemoryTopicStore>,
    pub messages: Arc<MemoryMessageStore>,
}

impl TestApp {
    /// Access token for an arbitrary subject.
    pub fn token(&self, user_id: DbId, role: Role) -> String {
        self.tokens.generate(user_id, role).unwrap().access_token
    }

    pub fn admin(&self) -> String {
        self.token(ADMIN_ID, Role::Admin)
    }

    pub fn alice(&self) -> String {
        self.token(ALICE_ID, Role::User)
    }

    pub fn bob(&self) -> String {
        self.token(BOB_ID, Role::User)
    }
}

/// Chat router over in-memory stores, verifying tokens in-process.
pub fn build_test_app() -> TestApp {
    let tokens = Arc::new(TokenManager::new(TokenConfig {
        secret: "chat-integration-secret".into(),
        access_ttl_mins: 15,
        refresh_ttl_days: 30,
    }));
    let messages = Arc::new(MemoryMessageStore::new());
    let topics = Arc::new(MemoryTopicStore::with_messages(messages.clone()));
    let categories = Arc::new(MemoryCategoryStore::with_topics(topics.clone()));
    let hub = Arc::new(Hub::default());

    let state = AppState::new(
        categories.clone(),
        topics.clone(),
        messages.clone(),
        Arc::new(LocalVerifier::new(tokens.clone())),
        hub.clone(),
    );
    let router =
        agora_web::server::with_middleware(build_router(state.clone()), &ServerConfig::default())
            .unwrap();

    TestApp {
        router,
        state,
        hub,
        tokens,
        categories,
        topics,
        messages,
    }
}

pub async fn seed_category(app: &TestApp, title: &str) -> Category {
    app.categories
        .create(CreateCategory {
            title: title.into(),
            description: String::new(),
        })
        .await
        .unwrap()
}

pub async fn seed_topic(app: &TestApp, category_id: DbId, author_id: DbId) -> Topic {
    app.topics
        .create(CreateTopic {
            category_id,
            title: "topic".into(),
            description: String::new(),
            author_id,
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
