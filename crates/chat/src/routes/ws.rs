use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws::handler;

/// Routes mounted at `/ws`.
pub fn router() -> Router<AppState> {
    Router::new().route("/topics/{id}", get(handler::subscribe))
}
