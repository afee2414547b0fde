use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{messages, topics};
use crate::state::AppState;

/// Routes mounted at `/topics`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(topics::create))
        .route(
            "/{id}",
            get(topics::get_by_id).put(topics::update).delete(topics::delete),
        )
        .route("/{id}/messages", get(messages::list).post(messages::send))
}
