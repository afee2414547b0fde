use std::time::Duration;

use agora_web::config::{env_or, env_required, ConfigError, ServerConfig};

use crate::auth::jwt::TokenConfig;

const DEFAULT_PORT: u16 = 8080;

/// Auth service configuration loaded from environment variables.
///
/// | Env Var                         | Default |
/// |---------------------------------|---------|
/// | `DATABASE_URL`                  | --      |
/// | `DATABASE_MAX_CONNECTIONS`      | `10`    |
/// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`  |
/// | `CLEANUP_TIMEOUT_SECS`          | `30`    |
/// | `REFRESH_COOKIE_SECURE`         | `true`  |
///
/// plus everything read by [`ServerConfig::from_env`] and
/// [`TokenConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub server: ServerConfig,
    pub jwt: TokenConfig,
    pub database_url: String,
    pub database_max_connections: u32,
    pub cleanup_interval: Duration,
    pub cleanup_timeout: Duration,
    /// Add `Secure` to the refresh cookie. Disable only for plain-HTTP development.
    pub refresh_cookie_secure: bool,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env(DEFAULT_PORT)?,
            jwt: TokenConfig::from_env()?,
            database_url: env_required("DATABASE_URL")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            cleanup_interval: Duration::from_secs(env_or("SESSION_CLEANUP_INTERVAL_SECS", 3600)?),
            cleanup_timeout: Duration::from_secs(env_or("CLEANUP_TIMEOUT_SECS", 30)?),
            refresh_cookie_secure: env_or("REFRESH_COOKIE_SECURE", true)?,
        })
    }
}
