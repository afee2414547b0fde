//! Service-to-service endpoints.

use agora_core::roles::Role;
use agora_core::types::DbId;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthUser;

/// Identity resolved from a bearer access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub user_id: DbId,
    pub role: Role,
}

/// POST /api/v1/internal/verify
///
/// 200 with the token's subject and role, or 401.
pub async fn verify(AuthUser(caller): AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        user_id: caller.user_id,
        role: caller.role,
    })
}
