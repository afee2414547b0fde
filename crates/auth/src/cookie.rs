//! The `refresh_token` cookie.
//!
//! The refresh token never appears in a JSON body; it travels only in this
//! `HttpOnly; SameSite=Strict` cookie scoped to the auth routes.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

use agora_core::error::{CoreError, CoreResult};

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";

/// `Set-Cookie` value carrying `token` for `max_age_secs`.
pub fn refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> CoreResult<HeaderValue> {
    build(token, max_age_secs, secure)
}

/// `Set-Cookie` value that removes the refresh cookie.
pub fn clear_refresh_cookie(secure: bool) -> CoreResult<HeaderValue> {
    build("", 0, secure)
}

fn build(value: &str, max_age_secs: i64, secure: bool) -> CoreResult<HeaderValue> {
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}={value}; Path={REFRESH_COOKIE_PATH}; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| CoreError::Internal(format!("invalid cookie header: {e}")))
}

/// Read the refresh token from the request's `Cookie` headers.
pub fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == REFRESH_COOKIE_NAME)
        .map(|(_, val)| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
