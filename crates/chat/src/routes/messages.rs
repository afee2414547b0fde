use axum::routing::put;
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Routes mounted at `/messages`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(messages::update).delete(messages::delete))
}
