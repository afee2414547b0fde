//! User service: registration, profile reads and updates, and the
//! admin-gated block/unblock/list operations.
//!
//! The caller is always passed in as an explicit [`Principal`].

use std::sync::Arc;

use agora_core::error::{CoreError, CoreResult};
use agora_core::roles::{Principal, Role};
use agora_core::store::{SessionStore, UserStore};
use agora_core::types::DbId;
use agora_core::user::{CreateUser, UpdateUser, User};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::blocking;

pub struct UserService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }

    /// Create a regular, unblocked user.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> CoreResult<User> {
        tracing::debug!("user.register called");
        validate_password_strength(password, MIN_PASSWORD_LENGTH)?;
        self.ensure_email_free(email).await?;

        let password = password.to_owned();
        let password_hash = blocking::run(move || hash_password(&password)).await?;

        // The store's unique constraint still guards the race between the
        // lookup above and this insert.
        let user = self
            .users
            .create(CreateUser {
                name: name.to_owned(),
                email: email.to_owned(),
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| e.context("user.register: create"))?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: DbId) -> CoreResult<User> {
        self.users
            .get_by_id(id)
            .await
            .map_err(|e| e.context("user.get_by_id"))
    }

    /// The caller's own record.
    pub async fn me(&self, caller: Principal) -> CoreResult<User> {
        self.get_by_id(caller.user_id).await
    }

    /// Apply profile changes. Self or admin only; blocked users cannot edit.
    pub async fn update(&self, caller: Principal, id: DbId, changes: UpdateUser) -> CoreResult<User> {
        tracing::debug!(user_id = id, "user.update called");
        caller.require_owner_or_admin(id)?;

        let mut user = self.get_by_id(id).await?;
        if user.is_blocked {
            tracing::warn!(user_id = id, "Blocked user tried to update profile");
            return Err(CoreError::UserBlocked);
        }

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            if email != user.email {
                self.ensure_email_free(&email).await?;
                user.email = email;
            }
        }
        if let Some(password) = changes.password {
            validate_password_strength(&password, MIN_PASSWORD_LENGTH)?;
            user.password_hash = blocking::run(move || hash_password(&password)).await?;
        }

        let user = self
            .users
            .update(&user)
            .await
            .map_err(|e| e.context("user.update"))?;
        tracing::info!(user_id = user.id, "User updated");
        Ok(user)
    }

    /// Block `target` and revoke its sessions.
    ///
    /// Session revocation is best-effort: a failure is logged and the block
    /// still stands, since login and refresh both check the flag.
    pub async fn block(&self, caller: Principal, target: DbId) -> CoreResult<()> {
        tracing::debug!(target_id = target, "user.block called");
        if let Err(e) = caller.require_admin() {
            tracing::warn!(initiator = caller.user_id, "Non-admin tried to block user");
            return Err(e);
        }

        self.users
            .block(target)
            .await
            .map_err(|e| e.context("user.block"))?;

        if let Err(e) = self.sessions.delete_by_user(target).await {
            tracing::error!(target_id = target, error = %e, "Session cleanup after block failed");
        }

        tracing::info!(target_id = target, "User blocked");
        Ok(())
    }

    pub async fn unblock(&self, caller: Principal, target: DbId) -> CoreResult<()> {
        tracing::debug!(target_id = target, "user.unblock called");
        if let Err(e) = caller.require_admin() {
            tracing::warn!(initiator = caller.user_id, "Non-admin tried to unblock user");
            return Err(e);
        }

        self.users
            .unblock(target)
            .await
            .map_err(|e| e.context("user.unblock"))?;
        tracing::info!(target_id = target, "User unblocked");
        Ok(())
    }

    pub async fn list_all(&self, caller: Principal) -> CoreResult<Vec<User>> {
        caller.require_admin()?;
        self.users
            .list_all()
            .await
            .map_err(|e| e.context("user.list_all"))
    }

    async fn ensure_email_free(&self, email: &str) -> CoreResult<()> {
        match self.users.get_by_email(email).await {
            Ok(_) => {
                tracing::warn!("Email already registered");
                Err(CoreError::Conflict("User with this email already exists".into()))
            }
            Err(CoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.context("user: lookup email")),
        }
    }
}
