//! Identity resolution through the auth service.

use std::time::Duration;

use agora_core::error::{CoreError, CoreResult};
use agora_core::identity::IdentityVerifier;
use agora_core::roles::{Principal, Role};
use agora_core::types::DbId;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

const VERIFY_PATH: &str = "/api/v1/internal/verify";

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Network failure, timeout, or undecodable body.
    #[error("Auth service request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Any status other than 200 or 401.
    #[error("Auth service returned HTTP {0}")]
    HttpStatus(u16),
}

impl From<VerifyError> for CoreError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Request(e) if e.is_timeout() => CoreError::DeadlineExceeded,
            other => CoreError::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerifyBody {
    user_id: DbId,
    role: Role,
}

/// Calls `POST {auth}/api/v1/internal/verify` with the caller's bearer token.
///
/// Fails closed: a 401 from the auth service is `InvalidToken`, and any
/// other failure (unreachable, timeout, unexpected status or body) is an
/// error rather than an anonymous caller.
pub struct RemoteVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl RemoteVerifier {
    pub fn new(auth_service_url: &str, timeout: Duration) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, auth_service_url))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, auth_service_url: &str) -> Self {
        Self {
            client,
            verify_url: format!("{}{VERIFY_PATH}", auth_service_url.trim_end_matches('/')),
        }
    }

    async fn call(&self, access_token: &str) -> Result<Option<Principal>, VerifyError> {
        let response = self
            .client
            .post(&self.verify_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: VerifyBody = response.json().await?;
                Ok(Some(Principal::new(body.user_id, body.role)))
            }
            StatusCode::UNAUTHORIZED => Ok(None),
            other => Err(VerifyError::HttpStatus(other.as_u16())),
        }
    }
}

#[async_trait]
impl IdentityVerifier for RemoteVerifier {
    async fn verify(&self, access_token: &str) -> CoreResult<Principal> {
        match self.call(access_token).await {
            Ok(Some(principal)) => Ok(principal),
            Ok(None) => Err(CoreError::InvalidToken),
            Err(e) => {
                tracing::error!(url = %self.verify_url, error = %e, "Identity verification failed");
                Err(e.into())
            }
        }
    }
}
