//! Handlers for the `/users` resource.

use agora_core::types::DbId;
use agora_core::user::{UpdateUser, UserResponse};
use agora_web::error::AppResult;
use agora_web::response::DataResponse;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `PUT /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state.users.me(caller).await?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// PUT /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;
    let user = state
        .users
        .update(
            caller,
            id,
            UpdateUser {
                name: input.name,
                email: input.email,
                password: input.password,
            },
        )
        .await?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}
