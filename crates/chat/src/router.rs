use axum::Router;

use crate::routes;
use crate::state::AppState;

/// The full chat service router, without the outer middleware stack.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state)
}
