//! Handlers for the `/categories` resource.

use agora_core::chat::{Category, Topic};
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
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// GET /api/v1/categories
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = state.categories.list().await?;
    Ok(Json(DataResponse::new(categories)))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category = state.categories.get(id).await?;
    Ok(Json(DataResponse::new(category)))
}

/// GET /api/v1/categories/{id}/topics
pub async fn list_topics(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Topic>>>> {
    let topics = state.topics.list_by_category(id).await?;
    Ok(Json(DataResponse::new(topics)))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let category = state
        .categories
        .create(caller, input.title, input.description)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(category))))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategoryRequest>,
) -> AppResult<Json<DataResponse<Category>>> {
    input.validate()?;
    let category = state
        .categories
        .update(
            caller,
            id,
            TitleChanges {
                title: input.title,
                description: input.description,
            },
        )
        .await?;
    Ok(Json(DataResponse::new(category)))
}

/// DELETE /api/v1/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.categories.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
