//! Admin-only user management.

use agora_core::types::DbId;
use agora_core::user::UserResponse;
use agora_web::error::AppResult;
use agora_web::response::DataResponse;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = state.users.list_all(caller).await?;
    Ok(Json(DataResponse::new(
        users.iter().map(UserResponse::from).collect(),
    )))
}

/// POST /api/v1/admin/users/{id}/block
pub async fn block_user(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.users.block(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/unblock
pub async fn unblock_user(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.users.unblock(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
