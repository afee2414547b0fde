//! Repository for the `users` table.

use agora_core::error::CoreResult;
use agora_core::store::UserStore;
use agora_core::types::DbId;
use agora_core::user::{CreateUser, User};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{classify, expect_affected};
use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, role, is_blocked, created_at, updated_at";

const ENTITY: &str = "user";

pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> CoreResult<User> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        row.try_into()
    }

    async fn set_blocked(&self, id: DbId, blocked: bool) -> CoreResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_blocked = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(blocked)
                .execute(&self.pool)
                .await
                .map_err(|e| classify(e, ENTITY))?;
        expect_affected(result.rows_affected(), ENTITY)
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn create(&self, input: CreateUser) -> CoreResult<User> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        row.try_into()
    }

    async fn update(&self, user: &User) -> CoreResult<User> {
        let query = format!(
            "UPDATE users SET
                name = $2,
                email = $3,
                password_hash = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        row.try_into()
    }

    async fn get_by_id(&self, id: DbId) -> CoreResult<User> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        row.try_into()
    }

    async fn get_by_email(&self, email: &str) -> CoreResult<User> {
        self.find_one("email", email).await
    }

    async fn get_by_username(&self, name: &str) -> CoreResult<User> {
        self.find_one("name", name).await
    }

    async fn block(&self, id: DbId) -> CoreResult<()> {
        self.set_blocked(id, true).await
    }

    async fn unblock(&self, id: DbId) -> CoreResult<()> {
        self.set_blocked(id, false).await
    }

    async fn list_all(&self) -> CoreResult<Vec<User>> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        rows.into_iter().map(User::try_from).collect()
    }
}
