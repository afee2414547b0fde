//! In-process identity verification.

use std::sync::Arc;

use agora_core::error::CoreResult;
use agora_core::identity::IdentityVerifier;
use agora_core::roles::Principal;
use async_trait::async_trait;

use crate::auth::jwt::TokenManager;

/// Verifies access tokens with a local [`TokenManager`].
///
/// Backs the auth service's own extractors and the `/internal/verify`
/// endpoint, and lets the chat service run without a network hop when both
/// services share a process and a secret.
#[derive(Clone)]
pub struct LocalVerifier {
    tokens: Arc<TokenManager>,
}

impl LocalVerifier {
    pub fn new(tokens: Arc<TokenManager>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl IdentityVerifier for LocalVerifier {
    async fn verify(&self, access_token: &str) -> CoreResult<Principal> {
        self.tokens.validate_access(access_token)
    }
}
