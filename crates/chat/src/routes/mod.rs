pub mod categories;
pub mod health;
pub mod messages;
pub mod topics;
pub mod ws;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /categories                         list (public), create (admin)
/// /categories/{id}                    get (public), update/delete (admin)
/// /categories/{id}/topics             topics of a category (public)
///
/// /topics                             create (auth)
/// /topics/{id}                        get (public), update/delete (author or admin)
/// /topics/{id}/messages               history (public), send (auth)
///
/// /messages/{id}                      edit (author), delete (author or admin)
///
/// /ws/topics/{id}                     live subscription (auth, WebSocket)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/topics", topics::router())
        .nest("/messages", messages::router())
        .nest("/ws", ws::router())
}
