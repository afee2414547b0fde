//! Handlers for the `/auth` resource.

use agora_core::error::CoreError;
use agora_core::session::SessionResponse;
use agora_core::user::UserResponse;
use agora_web::error::{AppError, AppResult};
use agora_web::response::DataResponse;
use axum::extract::State;
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::TokenPair;
use crate::cookie::{clear_refresh_cookie, extract_refresh_token, refresh_cookie};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const REFRESH_REJECTED: &str = "Invalid or expired refresh token";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Returned by login and refresh. The refresh token goes in the cookie.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let user = state
        .users
        .register(&input.name, &input.email, &input.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(UserResponse::from(&user))),
    ))
}

/// POST /api/v1/auth/login
///
/// Returns the access token in the body and sets the refresh cookie.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let pair = state
        .sessions
        .login(&input.email, &input.password, user_agent)
        .await?;
    token_response(&state, pair)
}

/// POST /api/v1/auth/refresh
///
/// Rotates the session behind the refresh cookie. Every rejection looks the
/// same to the client.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = extract_refresh_token(&headers)
        .ok_or_else(|| CoreError::Unauthenticated(REFRESH_REJECTED.into()))?;

    let pair = state.sessions.refresh(&token).await.map_err(|e| {
        if e.is_token_rejection() || matches!(e, CoreError::UserBlocked) {
            AppError::Core(CoreError::Unauthenticated(REFRESH_REJECTED.into()))
        } else {
            AppError::Core(e)
        }
    })?;
    token_response(&state, pair)
}

/// POST /api/v1/auth/logout
///
/// Revokes the session behind the refresh cookie and clears it.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = extract_refresh_token(&headers)
        .ok_or_else(|| AppError::BadRequest("Refresh token is missing".into()))?;
    state.sessions.revoke(&token).await?;
    cleared(&state)
}

/// POST /api/v1/auth/logout-all
///
/// Revokes every session of the caller.
pub async fn logout_all(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> AppResult<impl IntoResponse> {
    state.sessions.revoke_all(caller.user_id).await?;
    cleared(&state)
}

/// GET /api/v1/auth/sessions
///
/// 404 when the caller has no active sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> AppResult<Json<DataResponse<Vec<SessionResponse>>>> {
    let sessions = state.sessions.list(caller.user_id).await?;
    Ok(Json(DataResponse::new(
        sessions.iter().map(SessionResponse::from).collect(),
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn token_response(state: &AppState, pair: TokenPair) -> AppResult<impl IntoResponse> {
    let cookie = refresh_cookie(
        &pair.refresh_token,
        state.settings.refresh_ttl_secs,
        state.settings.refresh_cookie_secure,
    )?;
    Ok((
        [(SET_COOKIE, cookie)],
        Json(TokenResponse {
            access_token: pair.access_token,
            expires_in: state.settings.access_ttl_secs,
        }),
    ))
}

fn cleared(state: &AppState) -> AppResult<impl IntoResponse> {
    let cookie = clear_refresh_cookie(state.settings.refresh_cookie_secure)?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]))
}
