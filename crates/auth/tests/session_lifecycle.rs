//! Session Lifecycle Manager behaviour over the in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use agora_auth::auth::jwt::{hash_refresh_token, TokenConfig, TokenManager};
use agora_auth::auth::password::hash_password;
use agora_auth::sessions::SessionManager;
use agora_auth::users::UserService;
use agora_core::error::{CoreError, CoreResult};
use agora_core::memory::{MemorySessionStore, MemoryUserStore};
use agora_core::roles::{Principal, Role};
use agora_core::session::{CreateSession, Session};
use agora_core::store::{SessionStore, UserStore};
use agora_core::types::{DbId, Timestamp};
use agora_core::user::{CreateUser, User};
use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

const PASSWORD: &str = "correct-horse-battery";

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

struct Fixture {
    users: Arc<MemoryUserStore>,
    sessions: Arc<MemorySessionStore>,
    tokens: Arc<TokenManager>,
    manager: SessionManager,
}

fn fixture() -> Fixture {
    let users = Arc::new(MemoryUserStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let tokens = Arc::new(TokenManager::new(TokenConfig {
        secret: "lifecycle-test-secret".into(),
        access_ttl_mins: 15,
        refresh_ttl_days: 30,
    }));
    let manager = SessionManager::new(users.clone(), sessions.clone(), tokens.clone());
    Fixture {
        users,
        sessions,
        tokens,
        manager,
    }
}

async fn seed(fx: &Fixture, email: &str, role: Role) -> User {
    fx.users
        .create(CreateUser {
            name: "test".into(),
            email: email.into(),
            password_hash: hash_password(PASSWORD).unwrap(),
            role,
        })
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_persists_hashed_refresh_token() {
    let fx = fixture();
    let user = seed(&fx, "a@example.com", Role::User).await;

    let pair = fx.manager.login("a@example.com", PASSWORD, "ua/1").await.unwrap();

    let session = fx
        .sessions
        .get_by_token_hash(&hash_refresh_token(&pair.refresh_token))
        .await
        .unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(session.user_agent, "ua/1");
    assert_eq!(session.expires_at.timestamp(), pair.refresh_expires_at.timestamp());
    assert_ne!(session.refresh_token_hash, pair.refresh_token);

    let principal = fx.tokens.validate_access(&pair.access_token).unwrap();
    assert_eq!(principal, Principal::new(user.id, Role::User));
}

#[tokio::test]
async fn login_rejections() {
    let fx = fixture();
    let user = seed(&fx, "b@example.com", Role::User).await;

    assert_matches!(
        fx.manager.login("nobody@example.com", PASSWORD, "").await,
        Err(CoreError::InvalidCredentials)
    );
    assert_matches!(
        fx.manager.login("b@example.com", "wrong-password", "").await,
        Err(CoreError::InvalidCredentials)
    );

    fx.users.block(user.id).await.unwrap();
    // Blocked is reported regardless of the password.
    assert_matches!(
        fx.manager.login("b@example.com", "wrong-password", "").await,
        Err(CoreError::UserBlocked)
    );
    assert!(fx.sessions.is_empty().await);
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_rotates_exactly_once() {
    let fx = fixture();
    seed(&fx, "c@example.com", Role::User).await;
    let first = fx.manager.login("c@example.com", PASSWORD, "ua").await.unwrap();

    let second = fx.manager.refresh(&first.refresh_token).await.unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);

    assert_matches!(
        fx.manager.refresh(&first.refresh_token).await,
        Err(CoreError::NotFound { .. })
    );
    assert_eq!(fx.sessions.len().await, 1);

    // The successor keeps the device's user agent.
    let successor = fx
        .sessions
        .get_by_token_hash(&hash_refresh_token(&second.refresh_token))
        .await
        .unwrap();
    assert_eq!(successor.user_agent, "ua");
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let fx = fixture();
    seed(&fx, "d@example.com", Role::User).await;
    let pair = fx.manager.login("d@example.com", PASSWORD, "").await.unwrap();

    assert_matches!(
        fx.manager.refresh(&pair.access_token).await,
        Err(CoreError::InvalidToken)
    );
}

#[tokio::test]
async fn refresh_detects_subject_mismatch() {
    let fx = fixture();
    let owner = seed(&fx, "e@example.com", Role::User).await;
    let pair = fx.tokens.generate(owner.id, Role::User).unwrap();

    // A row for this token that belongs to somebody else.
    fx.sessions
        .save(CreateSession {
            user_id: owner.id + 100,
            refresh_token_hash: hash_refresh_token(&pair.refresh_token),
            user_agent: String::new(),
            expires_at: pair.refresh_expires_at,
        })
        .await
        .unwrap();

    assert_matches!(
        fx.manager.refresh(&pair.refresh_token).await,
        Err(CoreError::TokenMismatch)
    );
}

#[tokio::test]
async fn stored_expiry_is_authoritative() {
    let fx = fixture();
    let user = seed(&fx, "f@example.com", Role::User).await;
    let pair = fx.manager.login("f@example.com", PASSWORD, "").await.unwrap();

    // Shorten the session without touching the signed token.
    fx.sessions
        .save(CreateSession {
            user_id: user.id,
            refresh_token_hash: hash_refresh_token(&pair.refresh_token),
            user_agent: String::new(),
            expires_at: Utc::now() - chrono::Duration::seconds(1),
        })
        .await
        .unwrap();

    assert_matches!(
        fx.manager.refresh(&pair.refresh_token).await,
        Err(CoreError::ExpiredToken)
    );
}

#[tokio::test]
async fn refresh_rereads_role_and_block_flag() {
    let fx = fixture();
    let user = seed(&fx, "g@example.com", Role::User).await;
    let pair = fx.manager.login("g@example.com", PASSWORD, "").await.unwrap();

    // Blocked directly in the store, with the session left in place.
    fx.users.block(user.id).await.unwrap();

    assert_matches!(
        fx.manager.refresh(&pair.refresh_token).await,
        Err(CoreError::UserBlocked)
    );
}

#[tokio::test]
async fn block_revokes_access_on_next_refresh() {
    let fx = fixture();
    let admin = seed(&fx, "admin@example.com", Role::Admin).await;
    let user = seed(&fx, "h@example.com", Role::User).await;
    let pair = fx.manager.login("h@example.com", PASSWORD, "").await.unwrap();

    let service = UserService::new(fx.users.clone(), fx.sessions.clone());
    service
        .block(Principal::new(admin.id, Role::Admin), user.id)
        .await
        .unwrap();

    // Signature is still fine; the session row is gone.
    assert!(fx.tokens.validate_refresh(&pair.refresh_token).is_ok());
    assert_matches!(
        fx.manager.refresh(&pair.refresh_token).await,
        Err(CoreError::NotFound { .. })
    );
}

// ---------------------------------------------------------------------------
// Atomic rotation
// ---------------------------------------------------------------------------

/// Delegates to a real store but fails every rotation, as if the process
/// died between the delete and the insert.
struct CrashingRotate(Arc<MemorySessionStore>);

#[async_trait]
impl SessionStore for CrashingRotate {
    async fn save(&self, input: CreateSession) -> CoreResult<Session> {
        self.0.save(input).await
    }
    async fn get_by_token_hash(&self, hash: &str) -> CoreResult<Session> {
        self.0.get_by_token_hash(hash).await
    }
    async fn list_active_by_user(&self, user_id: DbId, now: Timestamp) -> CoreResult<Vec<Session>> {
        self.0.list_active_by_user(user_id, now).await
    }
    async fn delete_by_token_hash(&self, hash: &str) -> CoreResult<()> {
        self.0.delete_by_token_hash(hash).await
    }
    async fn delete_by_user(&self, user_id: DbId) -> CoreResult<u64> {
        self.0.delete_by_user(user_id).await
    }
    async fn delete_expired(&self, now: Timestamp) -> CoreResult<u64> {
        self.0.delete_expired(now).await
    }
    async fn rotate(&self, _old_hash: &str, _replacement: CreateSession) -> CoreResult<Session> {
        Err(CoreError::Internal("connection lost mid-transaction".into()))
    }
}

#[tokio::test]
async fn failed_rotation_keeps_old_session() {
    let fx = fixture();
    seed(&fx, "i@example.com", Role::User).await;
    let pair = fx.manager.login("i@example.com", PASSWORD, "").await.unwrap();

    let crashing = SessionManager::new(
        fx.users.clone(),
        Arc::new(CrashingRotate(fx.sessions.clone())),
        fx.tokens.clone(),
    );
    assert_matches!(
        crashing.refresh(&pair.refresh_token).await,
        Err(CoreError::Internal(msg)) if msg.starts_with("session.refresh: rotate session")
    );

    // Neither zero nor two sessions: the old one survives and still works.
    assert_eq!(fx.sessions.len().await, 1);
    assert!(fx
        .sessions
        .get_by_token_hash(&hash_refresh_token(&pair.refresh_token))
        .await
        .is_ok());
    assert!(fx.manager.refresh(&pair.refresh_token).await.is_ok());
}

// ---------------------------------------------------------------------------
// List / revoke
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_with_no_sessions_is_not_found() {
    let fx = fixture();
    let user = seed(&fx, "j@example.com", Role::User).await;

    assert_matches!(fx.manager.list(user.id).await, Err(CoreError::NotFound { .. }));

    fx.manager.login("j@example.com", PASSWORD, "").await.unwrap();
    assert_eq!(fx.manager.list(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn revoke_unknown_token_is_not_found() {
    let fx = fixture();
    assert_matches!(
        fx.manager.revoke("never-issued").await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn revoke_all_is_idempotent() {
    let fx = fixture();
    let user = seed(&fx, "k@example.com", Role::User).await;
    fx.manager.login("k@example.com", PASSWORD, "").await.unwrap();
    fx.manager.login("k@example.com", PASSWORD, "").await.unwrap();

    assert_eq!(fx.manager.revoke_all(user.id).await.unwrap(), 2);
    assert_eq!(fx.manager.revoke_all(user.id).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Expiry sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sweep_removes_only_expired() {
    let fx = fixture();
    let user = seed(&fx, "l@example.com", Role::User).await;
    let live = fx.manager.login("l@example.com", PASSWORD, "").await.unwrap();
    fx.sessions
        .save(CreateSession {
            user_id: user.id,
            refresh_token_hash: "stale-hash".into(),
            user_agent: String::new(),
            expires_at: Utc::now() - chrono::Duration::hours(1),
        })
        .await
        .unwrap();

    let removed = fx
        .manager
        .delete_expired(Duration::from_secs(5), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert_matches!(
        fx.sessions.get_by_token_hash("stale-hash").await,
        Err(CoreError::NotFound { .. })
    );
    assert!(fx
        .sessions
        .get_by_token_hash(&hash_refresh_token(&live.refresh_token))
        .await
        .is_ok());
}

#[tokio::test]
async fn sweep_honours_cancellation() {
    let fx = fixture();
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert_matches!(
        fx.manager.delete_expired(Duration::from_secs(5), &cancel).await,
        Err(CoreError::Canceled)
    );
}
