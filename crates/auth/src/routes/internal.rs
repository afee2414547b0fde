use axum::routing::post;
use axum::Router;

use crate::handlers::internal;
use crate::state::AppState;

/// Routes mounted at `/internal`.
pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(internal::verify))
}
