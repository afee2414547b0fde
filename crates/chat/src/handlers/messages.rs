//! Message history and mutations. Writes are pushed to live subscribers.

use agora_core::chat::Message;
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
use crate::state::AppState;

/// Body for both sending and editing a message.
#[derive(Debug, Deserialize, Validate)]
pub struct MessageRequest {
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// GET /api/v1/topics/{id}/messages
pub async fn list(
    State(state): State<AppState>,
    Path(topic_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let messages = state.messages.list_by_topic(topic_id).await?;
    Ok(Json(DataResponse::new(messages)))
}

/// POST /api/v1/topics/{id}/messages
pub async fn send(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(topic_id): Path<DbId>,
    Json(input): Json<MessageRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let message = state.messages.send(caller, topic_id, &input.content).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(message))))
}

/// PUT /api/v1/messages/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<MessageRequest>,
) -> AppResult<Json<DataResponse<Message>>> {
    input.validate()?;
    let message = state.messages.update(caller, id, &input.content).await?;
    Ok(Json(DataResponse::new(message)))
}

/// DELETE /api/v1/messages/{id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.messages.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
