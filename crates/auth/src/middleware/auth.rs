//! Bearer-token authentication extractor.

use agora_core::identity::IdentityVerifier;
use agora_core::roles::Principal;
use agora_web::auth::bearer_token;
use agora_web::error::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::state::AppState;

/// Authenticated caller extracted from `Authorization: Bearer <access token>`.
///
/// ```ignore
/// async fn me(AuthUser(caller): AuthUser) -> AppResult<Json<()>> { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let principal = state.verifier.verify(token).await?;
        Ok(AuthUser(principal))
    }
}
