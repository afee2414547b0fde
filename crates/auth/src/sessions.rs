//! Session Lifecycle Manager.
//!
//! Orchestrates login, refresh rotation, revocation, and the expiry sweep on
//! top of the [`TokenManager`] and the user/session stores.
//!
//! A session row moves `Issued -> Active -> {Rotated | Revoked | Expired}`.
//! Rotation deletes the old row and inserts its successor through
//! [`SessionStore::rotate`], so a failure mid-way never leaves zero or two
//! live sessions for one presented token.

use std::sync::Arc;
use std::time::Duration;

use agora_core::cleanup::with_deadline;
use agora_core::error::{CoreError, CoreResult};
use agora_core::session::{CreateSession, Session};
use agora_core::store::{SessionStore, UserStore};
use agora_core::types::DbId;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::auth::jwt::{hash_refresh_token, TokenManager, TokenPair};
use crate::auth::password::{dummy_verify, verify_password};
use crate::blocking;

pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<TokenManager>,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Authenticate by email and password and open a new session.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    /// A blocked user is told so before the password is checked.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        user_agent: &str,
    ) -> CoreResult<TokenPair> {
        tracing::debug!("session.login called");

        let user = match self.users.get_by_email(email).await {
            Ok(user) => user,
            Err(CoreError::NotFound { .. }) => {
                let password = password.to_owned();
                blocking::run(move || {
                    dummy_verify(&password);
                    Ok(())
                })
                .await?;
                tracing::warn!("Login rejected: unknown email");
                return Err(CoreError::InvalidCredentials);
            }
            Err(e) => return Err(e.context("session.login: lookup user")),
        };

        if user.is_blocked {
            tracing::warn!(user_id = user.id, "Login rejected: user is blocked");
            return Err(CoreError::UserBlocked);
        }

        let candidate = password.to_owned();
        let stored = user.password_hash.clone();
        let matches = blocking::run(move || verify_password(&candidate, &stored))
            .await
            .map_err(|e| e.context("session.login: verify password"))?;
        if !matches {
            tracing::warn!(user_id = user.id, "Login rejected: password mismatch");
            return Err(CoreError::InvalidCredentials);
        }

        let pair = self
            .tokens
            .generate(user.id, user.role)
            .map_err(|e| e.context("session.login: generate tokens"))?;

        self.sessions
            .save(CreateSession {
                user_id: user.id,
                refresh_token_hash: hash_refresh_token(&pair.refresh_token),
                user_agent: user_agent.to_owned(),
                expires_at: pair.refresh_expires_at,
            })
            .await
            .map_err(|e| e.context("session.login: save session"))?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair, consuming its session.
    ///
    /// The stored expiry is authoritative: a row past its expiry is rejected
    /// even when the signed token has not yet expired. The role in the new
    /// pair is re-read from the user record, and a blocked user cannot
    /// refresh.
    pub async fn refresh(&self, refresh_token: &str) -> CoreResult<TokenPair> {
        tracing::debug!("session.refresh called");

        let principal = self.tokens.validate_refresh(refresh_token).map_err(|e| {
            tracing::warn!(error = %e, "Refresh rejected: token failed validation");
            e
        })?;

        let old_hash = hash_refresh_token(refresh_token);
        let session = self
            .sessions
            .get_by_token_hash(&old_hash)
            .await
            .map_err(|e| e.context("session.refresh: get session"))?;

        if session.user_id != principal.user_id {
            tracing::warn!(
                token_user_id = principal.user_id,
                session_user_id = session.user_id,
                "Refresh rejected: subject mismatch"
            );
            return Err(CoreError::TokenMismatch);
        }

        if !session.is_active_at(Utc::now()) {
            tracing::warn!(user_id = session.user_id, "Refresh rejected: session expired");
            return Err(CoreError::ExpiredToken);
        }

        let user = self
            .users
            .get_by_id(session.user_id)
            .await
            .map_err(|e| e.context("session.refresh: lookup user"))?;
        if user.is_blocked {
            tracing::warn!(user_id = user.id, "Refresh rejected: user is blocked");
            return Err(CoreError::UserBlocked);
        }

        let pair = self
            .tokens
            .generate(user.id, user.role)
            .map_err(|e| e.context("session.refresh: generate tokens"))?;

        self.sessions
            .rotate(
                &old_hash,
                CreateSession {
                    user_id: user.id,
                    refresh_token_hash: hash_refresh_token(&pair.refresh_token),
                    user_agent: session.user_agent,
                    expires_at: pair.refresh_expires_at,
                },
            )
            .await
            .map_err(|e| e.context("session.refresh: rotate session"))?;

        tracing::info!(user_id = user.id, "Session refreshed");
        Ok(pair)
    }

    /// Active sessions of `user_id`. NotFound when there are none.
    pub async fn list(&self, user_id: DbId) -> CoreResult<Vec<Session>> {
        tracing::debug!(user_id, "session.list called");
        let sessions = self
            .sessions
            .list_active_by_user(user_id, Utc::now())
            .await
            .map_err(|e| e.context("session.list"))?;
        if sessions.is_empty() {
            tracing::warn!(user_id, "No active sessions found");
            return Err(CoreError::not_found("session"));
        }
        tracing::info!(user_id, count = sessions.len(), "Active sessions listed");
        Ok(sessions)
    }

    /// Delete the session for this exact refresh token. NotFound when absent.
    pub async fn revoke(&self, refresh_token: &str) -> CoreResult<()> {
        tracing::debug!("session.revoke called");
        self.sessions
            .delete_by_token_hash(&hash_refresh_token(refresh_token))
            .await
            .map_err(|e| e.context("session.revoke"))?;
        tracing::info!("Session revoked");
        Ok(())
    }

    /// Delete every session of `user_id`. Idempotent.
    pub async fn revoke_all(&self, user_id: DbId) -> CoreResult<u64> {
        tracing::debug!(user_id, "session.revoke_all called");
        let removed = self
            .sessions
            .delete_by_user(user_id)
            .await
            .map_err(|e| e.context("session.revoke_all"))?;
        tracing::info!(user_id, removed, "All sessions revoked");
        Ok(removed)
    }

    /// Remove sessions whose expiry has passed. Unbounded; the caller owns
    /// the deadline.
    pub async fn sweep_expired(&self) -> CoreResult<u64> {
        tracing::debug!("session.sweep_expired called");
        let removed = self
            .sessions
            .delete_expired(Utc::now())
            .await
            .map_err(|e| e.context("session.sweep_expired"))?;
        tracing::info!(removed, "Expired sessions deleted");
        Ok(removed)
    }

    /// [`Self::sweep_expired`] bounded by `timeout` and `cancel`.
    pub async fn delete_expired(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> CoreResult<u64> {
        with_deadline(timeout, cancel, self.sweep_expired())
            .await
            .map_err(|e| e.context("session.delete_expired"))
    }
}
