//! In-memory store adapters.
//!
//! Used by unit and integration tests and by single-process development
//! runs. Each store guards its state with one `tokio::sync::RwLock`, so every
//! method is atomic with respect to the others on the same store, which is
//! what [`SessionStore::rotate`] relies on.
//!
//! Chat stores can be linked (`with_topics`, `with_messages`) so deletes
//! cascade the way the relational schema does. Locks are always taken in
//! category, topic, message order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::chat::{Category, CreateCategory, CreateMessage, CreateTopic, Message, Topic};
use crate::error::{CoreError, CoreResult};
use crate::session::{CreateSession, Session};
use crate::store::{CategoryStore, MessageStore, SessionStore, TopicStore, UserStore};
use crate::types::{DbId, Timestamp};
use crate::user::{CreateUser, User};

/// Rows keyed by id with a BIGSERIAL-style counter.
struct Table<T> {
    next_id: DbId,
    rows: BTreeMap<DbId, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> DbId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Table<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn set_blocked(&self, id: DbId, blocked: bool) -> CoreResult<()> {
        let mut table = self.inner.write().await;
        let user = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("user"))?;
        user.is_blocked = blocked;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, input: CreateUser) -> CoreResult<User> {
        let mut table = self.inner.write().await;
        if table.rows.values().any(|u| u.email == input.email) {
            return Err(CoreError::Conflict("email already registered".into()));
        }
        let now = Utc::now();
        let user = User {
            id: table.allocate_id(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            role: input.role,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> CoreResult<User> {
        let mut table = self.inner.write().await;
        if table
            .rows
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(CoreError::Conflict("email already registered".into()));
        }
        let row = table
            .rows
            .get_mut(&user.id)
            .ok_or_else(|| CoreError::not_found("user"))?;
        row.name = user.name.clone();
        row.email = user.email.clone();
        row.password_hash = user.password_hash.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn get_by_id(&self, id: DbId) -> CoreResult<User> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("user"))
    }

    async fn get_by_email(&self, email: &str) -> CoreResult<User> {
        self.inner
            .read()
            .await
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| CoreError::not_found("user"))
    }

    async fn get_by_username(&self, name: &str) -> CoreResult<User> {
        self.inner
            .read()
            .await
            .rows
            .values()
            .find(|u| u.name == name)
            .cloned()
            .ok_or_else(|| CoreError::not_found("user"))
    }

    async fn block(&self, id: DbId) -> CoreResult<()> {
        self.set_blocked(id, true).await
    }

    async fn unblock(&self, id: DbId) -> CoreResult<()> {
        self.set_blocked(id, false).await
    }

    async fn list_all(&self) -> CoreResult<Vec<User>> {
        let table = self.inner.read().await;
        Ok(table.rows.values().rev().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SessionTable {
    next_id: DbId,
    by_hash: HashMap<String, Session>,
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<SessionTable>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_hash.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl SessionTable {
    fn upsert(&mut self, input: CreateSession) -> Session {
        if let Some(existing) = self.by_hash.get_mut(&input.refresh_token_hash) {
            existing.user_agent = input.user_agent;
            existing.expires_at = input.expires_at;
            return existing.clone();
        }
        self.next_id += 1;
        let session = Session {
            id: self.next_id,
            user_id: input.user_id,
            refresh_token_hash: input.refresh_token_hash,
            user_agent: input.user_agent,
            created_at: Utc::now(),
            expires_at: input.expires_at,
        };
        self.by_hash
            .insert(session.refresh_token_hash.clone(), session.clone());
        session
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, input: CreateSession) -> CoreResult<Session> {
        Ok(self.inner.write().await.upsert(input))
    }

    async fn get_by_token_hash(&self, hash: &str) -> CoreResult<Session> {
        self.inner
            .read()
            .await
            .by_hash
            .get(hash)
            .cloned()
            .ok_or_else(|| CoreError::not_found("session"))
    }

    async fn list_active_by_user(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> CoreResult<Vec<Session>> {
        let table = self.inner.read().await;
        let mut sessions: Vec<Session> = table
            .by_hash
            .values()
            .filter(|s| s.user_id == user_id && s.is_active_at(now))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }

    async fn delete_by_token_hash(&self, hash: &str) -> CoreResult<()> {
        self.inner
            .write()
            .await
            .by_hash
            .remove(hash)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("session"))
    }

    async fn delete_by_user(&self, user_id: DbId) -> CoreResult<u64> {
        let mut table = self.inner.write().await;
        let before = table.by_hash.len();
        table.by_hash.retain(|_, s| s.user_id != user_id);
        Ok((before - table.by_hash.len()) as u64)
    }

    async fn delete_expired(&self, now: Timestamp) -> CoreResult<u64> {
        let mut table = self.inner.write().await;
        let before = table.by_hash.len();
        table.by_hash.retain(|_, s| s.expires_at >= now);
        Ok((before - table.by_hash.len()) as u64)
    }

    async fn rotate(&self, old_hash: &str, replacement: CreateSession) -> CoreResult<Session> {
        let mut table = self.inner.write().await;
        if !table.by_hash.contains_key(old_hash) {
            return Err(CoreError::not_found("session"));
        }
        if replacement.refresh_token_hash != old_hash
            && table.by_hash.contains_key(&replacement.refresh_token_hash)
        {
            return Err(CoreError::Conflict("refresh token already in use".into()));
        }
        table.by_hash.remove(old_hash);
        Ok(table.upsert(replacement))
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCategoryStore {
    inner: RwLock<Table<Category>>,
    topics: Option<Arc<MemoryTopicStore>>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleting a category also deletes its topics (and their messages).
    pub fn with_topics(topics: Arc<MemoryTopicStore>) -> Self {
        Self {
            inner: RwLock::default(),
            topics: Some(topics),
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn list(&self) -> CoreResult<Vec<Category>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: DbId) -> CoreResult<Category> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("category"))
    }

    async fn create(&self, input: CreateCategory) -> CoreResult<Category> {
        let mut table = self.inner.write().await;
        let category = Category {
            id: table.allocate_id(),
            title: input.title,
            description: input.description,
            created_at: Utc::now(),
        };
        table.rows.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: &Category) -> CoreResult<Category> {
        let mut table = self.inner.write().await;
        let row = table
            .rows
            .get_mut(&category.id)
            .ok_or_else(|| CoreError::not_found("category"))?;
        row.title = category.title.clone();
        row.description = category.description.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        let mut table = self.inner.write().await;
        table
            .rows
            .remove(&id)
            .ok_or_else(|| CoreError::not_found("category"))?;
        if let Some(topics) = &self.topics {
            topics.remove_by_category(id).await;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryTopicStore {
    inner: RwLock<Table<Topic>>,
    messages: Option<Arc<MemoryMessageStore>>,
}

impl MemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleting a topic also deletes its messages.
    pub fn with_messages(messages: Arc<MemoryMessageStore>) -> Self {
        Self {
            inner: RwLock::default(),
            messages: Some(messages),
        }
    }

    async fn remove_by_category(&self, category_id: DbId) -> u64 {
        let mut table = self.inner.write().await;
        let doomed: Vec<DbId> = table
            .rows
            .values()
            .filter(|t| t.category_id == category_id)
            .map(|t| t.id)
            .collect();
        for id in &doomed {
            table.rows.remove(id);
            if let Some(messages) = &self.messages {
                messages.remove_by_topic(*id).await;
            }
        }
        doomed.len() as u64
    }
}

#[async_trait]
impl TopicStore for MemoryTopicStore {
    async fn list_by_category(&self, category_id: DbId) -> CoreResult<Vec<Topic>> {
        let table = self.inner.read().await;
        Ok(table
            .rows
            .values()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: DbId) -> CoreResult<Topic> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("topic"))
    }

    async fn create(&self, input: CreateTopic) -> CoreResult<Topic> {
        let mut table = self.inner.write().await;
        let topic = Topic {
            id: table.allocate_id(),
            category_id: input.category_id,
            title: input.title,
            description: input.description,
            author_id: input.author_id,
            created_at: Utc::now(),
        };
        table.rows.insert(topic.id, topic.clone());
        Ok(topic)
    }

    async fn update(&self, topic: &Topic) -> CoreResult<Topic> {
        let mut table = self.inner.write().await;
        let row = table
            .rows
            .get_mut(&topic.id)
            .ok_or_else(|| CoreError::not_found("topic"))?;
        row.title = topic.title.clone();
        row.description = topic.description.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        let mut table = self.inner.write().await;
        table
            .rows
            .remove(&id)
            .ok_or_else(|| CoreError::not_found("topic"))?;
        if let Some(messages) = &self.messages {
            messages.remove_by_topic(id).await;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryMessageStore {
    inner: RwLock<Table<Message>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message with an explicit creation time (backdating in tests).
    pub async fn insert_at(&self, input: CreateMessage, created_at: Timestamp) -> Message {
        let mut table = self.inner.write().await;
        let message = Message {
            id: table.allocate_id(),
            topic_id: input.topic_id,
            author_id: input.author_id,
            content: input.content,
            created_at,
            updated_at: created_at,
        };
        table.rows.insert(message.id, message.clone());
        message
    }

    async fn remove_by_topic(&self, topic_id: DbId) -> u64 {
        let mut table = self.inner.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, m| m.topic_id != topic_id);
        (before - table.rows.len()) as u64
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create(&self, input: CreateMessage) -> CoreResult<Message> {
        Ok(self.insert_at(input, Utc::now()).await)
    }

    async fn update(&self, id: DbId, content: &str) -> CoreResult<Message> {
        let mut table = self.inner.write().await;
        let row = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("message"))?;
        row.content = content.to_string();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        self.inner
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("message"))
    }

    async fn get(&self, id: DbId) -> CoreResult<Message> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("message"))
    }

    async fn list_by_topic(&self, topic_id: DbId) -> CoreResult<Vec<Message>> {
        let table = self.inner.read().await;
        let mut list: Vec<Message> = table
            .rows
            .values()
            .filter(|m| m.topic_id == topic_id)
            .cloned()
            .collect();
        list.sort_by_key(|m| (m.created_at, m.id));
        Ok(list)
    }

    async fn delete_older_than(&self, threshold: Timestamp) -> CoreResult<u64> {
        let mut table = self.inner.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, m| m.created_at >= threshold);
        Ok((before - table.rows.len()) as u64)
    }
}
