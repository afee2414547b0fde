use std::time::Duration;

use agora_web::config::{env_or, env_required, ConfigError, ServerConfig};

use crate::ws::DEFAULT_QUEUE_CAPACITY;

const DEFAULT_PORT: u16 = 8081;

/// Chat service configuration loaded from environment variables.
///
/// | Env Var                         | Default |
/// |---------------------------------|---------|
/// | `DATABASE_URL`                  | --      |
/// | `DATABASE_MAX_CONNECTIONS`      | `10`    |
/// | `AUTH_SERVICE_URL`              | --      |
/// | `AUTH_VERIFY_TIMEOUT_SECS`      | `5`     |
/// | `MESSAGE_RETENTION_HOURS`       | `720`   |
/// | `MESSAGE_CLEANUP_INTERVAL_SECS` | `3600`  |
/// | `CLEANUP_TIMEOUT_SECS`          | `60`    |
/// | `WS_QUEUE_CAPACITY`             | `32`    |
///
/// plus everything read by [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Base URL of the auth service, e.g. `http://auth:8080`.
    pub auth_service_url: String,
    pub auth_verify_timeout: Duration,
    /// Messages older than this are purged.
    pub message_retention: Duration,
    pub cleanup_interval: Duration,
    pub cleanup_timeout: Duration,
    pub ws_queue_capacity: usize,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let retention_hours: u64 = env_or("MESSAGE_RETENTION_HOURS", 720)?;
        Ok(Self {
            server: ServerConfig::from_env(DEFAULT_PORT)?,
            database_url: env_required("DATABASE_URL")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            auth_service_url: env_required("AUTH_SERVICE_URL")?,
            auth_verify_timeout: Duration::from_secs(env_or("AUTH_VERIFY_TIMEOUT_SECS", 5)?),
            message_retention: Duration::from_secs(retention_hours * 3600),
            cleanup_interval: Duration::from_secs(env_or("MESSAGE_CLEANUP_INTERVAL_SECS", 3600)?),
            cleanup_timeout: Duration::from_secs(env_or("CLEANUP_TIMEOUT_SECS", 60)?),
            ws_queue_capacity: env_or("WS_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
        })
    }
}
