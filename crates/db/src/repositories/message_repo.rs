//! Repository for the `messages` table.

use agora_core::chat::{CreateMessage, Message};
use agora_core::error::CoreResult;
use agora_core::store::MessageStore;
use agora_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{classify, expect_affected};
use crate::models::chat::MessageRow;

const COLUMNS: &str = "id, topic_id, author_id, content, created_at, updated_at";

const ENTITY: &str = "message";

pub struct MessageRepo {
    pool: PgPool,
}

impl MessageRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepo {
    async fn create(&self, input: CreateMessage) -> CoreResult<Message> {
        let query = format!(
            "INSERT INTO messages (topic_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(input.topic_id)
            .bind(input.author_id)
            .bind(&input.content)
            .fetch_one(&self.pool)
            .await
            .map(Message::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn update(&self, id: DbId, content: &str) -> CoreResult<Message> {
        let query = format!(
            "UPDATE messages SET content = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(id)
            .bind(content)
            .fetch_one(&self.pool)
            .await
            .map(Message::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        expect_affected(result.rows_affected(), ENTITY)
    }

    async fn get(&self, id: DbId) -> CoreResult<Message> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map(Message::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn list_by_topic(&self, topic_id: DbId) -> CoreResult<Vec<Message>> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages WHERE topic_id = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, MessageRow>(&query)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn delete_older_than(&self, threshold: Timestamp) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE created_at < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        Ok(result.rows_affected())
    }
}
