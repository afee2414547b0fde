//! Session entity: one row per issued refresh token.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A single refresh-token grant.
///
/// Only the SHA-256 digest of the refresh token is kept; the raw token
/// lives with the client.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub user_agent: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Session {
    /// A session is active strictly before its expiry instant.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// DTO for persisting a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub user_agent: String,
    pub expires_at: Timestamp,
}

/// Session as shown to its owner (no token material).
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: DbId,
    pub user_agent: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<&Session> for SessionResponse {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id,
            user_agent: s.user_agent.clone(),
            created_at: s.created_at,
            expires_at: s.expires_at,
        }
    }
}
