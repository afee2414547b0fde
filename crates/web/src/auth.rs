//! Bearer-token extraction.

use agora_core::error::CoreError;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthenticated("Missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            CoreError::Unauthenticated(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            )
        })
}
