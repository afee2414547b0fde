//! Repository for the `topics` table.

use agora_core::chat::{CreateTopic, Topic};
use agora_core::error::CoreResult;
use agora_core::store::TopicStore;
use agora_core::types::DbId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{classify, expect_affected};
use crate::models::chat::TopicRow;

const COLUMNS: &str = "id, category_id, title, description, author_id, created_at";

const ENTITY: &str = "topic";

pub struct TopicRepo {
    pool: PgPool,
}

impl TopicRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopicStore for TopicRepo {
    async fn list_by_category(&self, category_id: DbId) -> CoreResult<Vec<Topic>> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE category_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, TopicRow>(&query)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        Ok(rows.into_iter().map(Topic::from).collect())
    }

    async fn get(&self, id: DbId) -> CoreResult<Topic> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1");
        sqlx::query_as::<_, TopicRow>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map(Topic::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn create(&self, input: CreateTopic) -> CoreResult<Topic> {
        let query = format!(
            "INSERT INTO topics (category_id, title, description, author_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TopicRow>(&query)
            .bind(input.category_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
            .map(Topic::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn update(&self, topic: &Topic) -> CoreResult<Topic> {
        let query = format!(
            "UPDATE topics SET title = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TopicRow>(&query)
            .bind(topic.id)
            .bind(&topic.title)
            .bind(&topic.description)
            .fetch_one(&self.pool)
            .await
            .map(Topic::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        expect_affected(result.rows_affected(), ENTITY)
    }
}
