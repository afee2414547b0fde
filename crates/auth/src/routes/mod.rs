pub mod admin;
pub mod auth;
pub mod health;
pub mod internal;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                      register (public)
/// /auth/login                         login (public)
/// /auth/refresh                       rotate refresh cookie (public)
/// /auth/logout                        revoke cookie session (public)
/// /auth/logout-all                    revoke all sessions (auth)
/// /auth/sessions                      list active sessions (auth)
///
/// /users/me                           own profile (auth)
/// /users/{id}                         update profile (self or admin)
///
/// /admin/users                        list users (admin)
/// /admin/users/{id}/block             block (admin)
/// /admin/users/{id}/unblock           unblock (admin)
///
/// /internal/verify                    resolve bearer token (service-to-service)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/internal", internal::router())
}
