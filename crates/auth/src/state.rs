use std::sync::Arc;

use agora_core::store::{SessionStore, UserStore};

use crate::auth::jwt::{TokenConfig, TokenManager};
use crate::sessions::SessionManager;
use crate::users::UserService;
use crate::verify::LocalVerifier;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub users: Arc<UserService>,
    pub verifier: LocalVerifier,
    pub settings: Arc<HttpSettings>,
    /// Present in production; `None` when running on in-memory stores.
    pub pool: Option<agora_db::DbPool>,
}

/// Values the HTTP layer needs beyond the services themselves.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Lifetime of an access token, reported to clients as `expires_in`.
    pub access_ttl_secs: i64,
    /// Cookie `Max-Age` for the refresh token.
    pub refresh_ttl_secs: i64,
    pub refresh_cookie_secure: bool,
}

impl AppState {
    /// Wire the services over the given stores.
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        jwt: TokenConfig,
        refresh_cookie_secure: bool,
    ) -> Self {
        let settings = HttpSettings {
            access_ttl_secs: jwt.access_ttl().num_seconds(),
            refresh_ttl_secs: jwt.refresh_ttl().num_seconds(),
            refresh_cookie_secure,
        };
        let tokens = Arc::new(TokenManager::new(jwt));

        Self {
            sessions: Arc::new(SessionManager::new(
                Arc::clone(&users),
                Arc::clone(&sessions),
                Arc::clone(&tokens),
            )),
            users: Arc::new(UserService::new(users, sessions)),
            verifier: LocalVerifier::new(tokens),
            settings: Arc::new(settings),
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: agora_db::DbPool) -> Self {
        self.pool = Some(pool);
        self
    }
}
