//! Handlers for the `/topics` resource.

use agora_core::chat::Topic;
use agora_core::types::DbId;
use agora_web::error::AppResult;
use agora_web::response::DataResponse;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::auth::AuthUser;
use crate::services::TitleChanges;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    pub category_id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTopicRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// GET /api/v1/topics/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Topic>>> {
    let topic = state.topics.get(id).await?;
    Ok(Json(DataResponse::new(topic)))
}

/// POST /api/v1/topics
pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(input): Json<CreateTopicRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let topic = state
        .topics
        .create(caller, input.category_id, input.title, input.description)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(topic))))
}

/// PUT /api/v1/topics/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTopicRequest>,
) -> AppResult<Json<DataResponse<Topic>>> {
    input.validate()?;
    let topic = state
        .topics
        .update(
            caller,
            id,
            TitleChanges {
                title: input.title,
                description: input.description,
            },
        )
        .await?;
    Ok(Json(DataResponse::new(topic)))
}

/// DELETE /api/v1/topics/{id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.topics.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
