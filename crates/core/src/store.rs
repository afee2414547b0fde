//! Persistence boundaries consumed by the services.
//!
//! Each trait has one production adapter (PostgreSQL, in `agora-db`) and one
//! in-memory adapter ([`crate::memory`]) for tests and local runs.
//!
//! Conventions shared by every adapter:
//! - a lookup or single-row mutation that matches nothing returns
//!   [`CoreError::NotFound`](crate::error::CoreError::NotFound);
//! - a unique-constraint violation returns
//!   [`CoreError::Conflict`](crate::error::CoreError::Conflict);
//! - bulk deletes are idempotent and report the number of rows removed;
//! - anything else is [`CoreError::Internal`](crate::error::CoreError::Internal).

use async_trait::async_trait;

use crate::chat::{Category, CreateCategory, CreateMessage, CreateTopic, Message, Topic};
use crate::error::CoreResult;
use crate::session::{CreateSession, Session};
use crate::types::{DbId, Timestamp};
use crate::user::{CreateUser, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Conflict when the email is already taken.
    async fn create(&self, input: CreateUser) -> CoreResult<User>;

    /// Persist name, email, and password hash of an existing user.
    async fn update(&self, user: &User) -> CoreResult<User>;

    async fn get_by_id(&self, id: DbId) -> CoreResult<User>;

    async fn get_by_email(&self, email: &str) -> CoreResult<User>;

    async fn get_by_username(&self, name: &str) -> CoreResult<User>;

    async fn block(&self, id: DbId) -> CoreResult<()>;

    async fn unblock(&self, id: DbId) -> CoreResult<()>;

    /// All users, newest first.
    async fn list_all(&self) -> CoreResult<Vec<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session, overwriting the row that already holds the same
    /// refresh-token hash.
    async fn save(&self, input: CreateSession) -> CoreResult<Session>;

    /// Look up by refresh-token hash, regardless of expiry.
    async fn get_by_token_hash(&self, hash: &str) -> CoreResult<Session>;

    /// Sessions of `user_id` whose expiry is after `now`.
    async fn list_active_by_user(&self, user_id: DbId, now: Timestamp)
        -> CoreResult<Vec<Session>>;

    /// NotFound when no row holds `hash`.
    async fn delete_by_token_hash(&self, hash: &str) -> CoreResult<()>;

    /// Idempotent; returns the number of rows removed.
    async fn delete_by_user(&self, user_id: DbId) -> CoreResult<u64>;

    /// Remove every row with `expires_at < now`. Idempotent.
    async fn delete_expired(&self, now: Timestamp) -> CoreResult<u64>;

    /// Atomically delete the row holding `old_hash` and insert `replacement`.
    ///
    /// Either both happen or neither does. NotFound when `old_hash` is absent;
    /// Conflict when `replacement` collides with a different existing row.
    async fn rotate(&self, old_hash: &str, replacement: CreateSession) -> CoreResult<Session>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Category>>;
    async fn get(&self, id: DbId) -> CoreResult<Category>;
    async fn create(&self, input: CreateCategory) -> CoreResult<Category>;
    async fn update(&self, category: &Category) -> CoreResult<Category>;
    async fn delete(&self, id: DbId) -> CoreResult<()>;
}

#[async_trait]
pub trait TopicStore: Send + Sync {
    async fn list_by_category(&self, category_id: DbId) -> CoreResult<Vec<Topic>>;
    async fn get(&self, id: DbId) -> CoreResult<Topic>;
    async fn create(&self, input: CreateTopic) -> CoreResult<Topic>;
    /// Persists title and description.
    async fn update(&self, topic: &Topic) -> CoreResult<Topic>;
    async fn delete(&self, id: DbId) -> CoreResult<()>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create(&self, input: CreateMessage) -> CoreResult<Message>;
    async fn update(&self, id: DbId, content: &str) -> CoreResult<Message>;
    async fn delete(&self, id: DbId) -> CoreResult<()>;
    async fn get(&self, id: DbId) -> CoreResult<Message>;
    /// History of a topic, oldest first.
    async fn list_by_topic(&self, topic_id: DbId) -> CoreResult<Vec<Message>>;
    /// Remove every message created before `threshold`. Idempotent.
    async fn delete_older_than(&self, threshold: Timestamp) -> CoreResult<u64>;
}
