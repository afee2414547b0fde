//! Error taxonomy shared by every service and store adapter.
//!
//! Store adapters translate backend failures into these kinds so that the
//! use-case layer can branch on *what* went wrong without knowing *where*.
//! The HTTP layer (`agora-web`) maps each kind to a stable status and code.

/// Domain-level error kinds.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is blocked")]
    UserBlocked,

    /// Bad signature, malformed token, or wrong token kind.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    /// The session row belongs to a different user than the token subject.
    #[error("Token subject does not match session owner")]
    TokenMismatch,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Operation canceled")]
    Canceled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used by stores and services.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str) -> Self {
        CoreError::NotFound { entity }
    }

    /// Prefix call-site context onto an infrastructure error.
    ///
    /// Domain kinds pass through unchanged so callers can still match on them.
    pub fn context(self, op: &str) -> Self {
        match self {
            CoreError::Internal(msg) => CoreError::Internal(format!("{op}: {msg}")),
            other => other,
        }
    }

    /// `true` for the kinds that describe a bad or stale credential.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidToken
                | CoreError::ExpiredToken
                | CoreError::TokenMismatch
                | CoreError::NotFound { .. }
        )
    }
}
