//! Repository for the `sessions` table.

use agora_core::error::{CoreError, CoreResult};
use agora_core::session::{CreateSession, Session};
use agora_core::store::SessionStore;
use agora_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{classify, expect_affected};
use crate::models::session::SessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token_hash, user_agent, created_at, expires_at";

const ENTITY: &str = "session";

pub struct SessionRepo {
    pool: PgPool,
}

impl SessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepo {
    async fn save(&self, input: CreateSession) -> CoreResult<Session> {
        let query = format!(
            "INSERT INTO sessions (user_id, refresh_token_hash, user_agent, expires_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (refresh_token_hash) DO UPDATE SET
                user_agent = EXCLUDED.user_agent,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.user_agent)
            .bind(input.expires_at)
            .fetch_one(&self.pool)
            .await
            .map(Session::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn get_by_token_hash(&self, hash: &str) -> CoreResult<Session> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE refresh_token_hash = $1");
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(hash)
            .fetch_one(&self.pool)
            .await
            .map(Session::from)
            .map_err(|e| classify(e, ENTITY))
    }

    async fn list_active_by_user(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> CoreResult<Vec<Session>> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE user_id = $1 AND expires_at > $2
             ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    async fn delete_by_token_hash(&self, hash: &str) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE refresh_token_hash = $1")
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        expect_affected(result.rows_affected(), ENTITY)
    }

    async fn delete_by_user(&self, user_id: DbId) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: Timestamp) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        Ok(result.rows_affected())
    }

    async fn rotate(&self, old_hash: &str, replacement: CreateSession) -> CoreResult<Session> {
        let mut tx = self.pool.begin().await.map_err(|e| classify(e, ENTITY))?;

        let deleted = sqlx::query("DELETE FROM sessions WHERE refresh_token_hash = $1")
            .bind(old_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(e, ENTITY))?;
        if deleted.rows_affected() == 0 {
            // Dropping `tx` rolls back.
            return Err(CoreError::not_found(ENTITY));
        }

        let query = format!(
            "INSERT INTO sessions (user_id, refresh_token_hash, user_agent, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(replacement.user_id)
            .bind(&replacement.refresh_token_hash)
            .bind(&replacement.user_agent)
            .bind(replacement.expires_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(e, ENTITY))?;

        tx.commit().await.map_err(|e| classify(e, ENTITY))?;
        Ok(row.into())
    }
}
