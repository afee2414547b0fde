//! Repository for the `categories` table.

use agora_core::chat::{Category, CreateCategory};
use agora_core::error::CoreResult;
use agora_core::store::CategoryStore;
use agora_core::types::DbId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{classify, expect_affected};
use crate::models::chat::CategoryRow;

const COLUMNS: &str = "id, title, description, created_at";

const ENTITY: &str = "category";

pub struct CategoryRepo {
    pool: PgPool,
}

impl CategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for CategoryRepo {
    async fn list(&self) -> CoreResult<Vec<Category>> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY id");
        let rows = sqlx::query_as::<_, CategoryRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get(&self, id: DbId) -> CoreResult<Category> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map(Category::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn create(&self, input: CreateCategory) -> CoreResult<Category> {
        let query = format!(
            "INSERT INTO categories (title, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(&self.pool)
            .await
            .map(Category::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn update(&self, category: &Category) -> CoreResult<Category> {
        let query = format!(
            "UPDATE categories SET title = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(category.id)
            .bind(&category.title)
            .bind(&category.description)
            .fetch_one(&self.pool)
            .await
            .map(Category::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn delete(&self, id: DbId) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        expect_affected(result.rows_affected(), ENTITY)
    }
}
