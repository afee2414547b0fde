//! Token Manager: HS256 access/refresh token pairs.
//!
//! Both tokens of a pair are signed JWTs carrying the same subject and role
//! and a `kind` discriminator, so a refresh token is never accepted where an
//! access token is expected (and vice versa). Validation is fail-closed: any
//! signature, parse, kind, or expiry problem rejects the token.
//!
//! Sessions store only the SHA-256 hash of the refresh token (see
//! [`hash_refresh_token`]), so a leaked `sessions` table cannot be replayed.

use agora_core::error::{CoreError, CoreResult};
use agora_core::roles::{Principal, Role};
use agora_core::types::{DbId, Timestamp};
use agora_web::config::{env_or, env_required, ConfigError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Which half of a pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims embedded in both token kinds.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub role: Role,
    pub kind: TokenKind,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier; keeps two pairs minted in the same second distinct.
    pub jti: String,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_ttl_mins: i64,
    /// Refresh token lifetime in days (default: 30).
    pub refresh_ttl_days: i64,
}

const DEFAULT_ACCESS_TTL_MINS: i64 = 15;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

impl TokenConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `JWT_SECRET`            | **yes**  | --      |
    /// | `JWT_ACCESS_TTL_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_TTL_DAYS`  | no       | `30`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env_required("JWT_SECRET")?,
            access_ttl_mins: env_or("JWT_ACCESS_TTL_MINS", DEFAULT_ACCESS_TTL_MINS)?,
            refresh_ttl_days: env_or("JWT_REFRESH_TTL_DAYS", DEFAULT_REFRESH_TTL_DAYS)?,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_ttl_mins)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_ttl_days)
    }
}

/// Stateless signer/verifier. Pure function of the secret and the clock.
pub struct TokenManager {
    config: TokenConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked after the kind, exactly, with no grace window.
        validation.leeway = 0;
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Mint an access/refresh pair for `user_id` with `role`.
    pub fn generate(&self, user_id: DbId, role: Role) -> CoreResult<TokenPair> {
        let now = Utc::now();
        let access_expires_at = now + self.config.access_ttl();
        let refresh_expires_at = now + self.config.refresh_ttl();

        Ok(TokenPair {
            access_token: self.sign(user_id, role, TokenKind::Access, now, access_expires_at)?,
            refresh_token: self.sign(user_id, role, TokenKind::Refresh, now, refresh_expires_at)?,
            access_expires_at,
            refresh_expires_at,
        })
    }

    pub fn validate_access(&self, token: &str) -> CoreResult<Principal> {
        self.validate(token, TokenKind::Access)
    }

    pub fn validate_refresh(&self, token: &str) -> CoreResult<Principal> {
        self.validate(token, TokenKind::Refresh)
    }

    fn sign(
        &self,
        user_id: DbId,
        role: Role,
        kind: TokenKind,
        issued_at: Timestamp,
        expires_at: Timestamp,
    ) -> CoreResult<String> {
        let claims = Claims {
            sub: user_id,
            role,
            kind,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CoreError::Internal(format!("token signing failed: {e}")))
    }

    fn validate(&self, token: &str, expected: TokenKind) -> CoreResult<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| CoreError::InvalidToken)?;
        if data.claims.kind != expected {
            return Err(CoreError::InvalidToken);
        }
        if data.claims.exp < Utc::now().timestamp() {
            return Err(CoreError::ExpiredToken);
        }
        Ok(Principal::new(data.claims.sub, data.claims.role))
    }
}

/// Compute the SHA-256 hex digest of a refresh token.
///
/// This digest is what the session store keys on.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
