//! Resolution of a bearer access token into a [`Principal`].

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::roles::Principal;

/// Verifies an access token and yields the caller identity.
///
/// Implementations must fail closed: any doubt about the token is an error,
/// never an anonymous or default principal.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, access_token: &str) -> CoreResult<Principal>;
}
