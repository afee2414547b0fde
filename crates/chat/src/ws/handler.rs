use agora_core::types::DbId;
use agora_web::auth::bearer_token;
use agora_web::error::AppResult;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::Deserialize;

use super::connection;
use crate::state::AppState;

/// Browsers cannot set headers on a WebSocket handshake, so the access
/// token may also travel as `?token=`.
#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub token: Option<String>,
}

/// GET /api/v1/ws/topics/{id}
///
/// Authenticates the caller and checks the topic exists before upgrading,
/// so those failures come back as ordinary 401/404 responses.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(topic_id): Path<DbId>,
    Query(query): Query<SubscribeQuery>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> AppResult<Response> {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(e) => query
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(e)?,
    };
    let caller = state.verifier.verify(token).await?;
    state.topics.get(topic_id).await?;

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    tracing::info!(topic_id, user_id = caller.user_id, "WebSocket upgrade accepted");
    let hub = state.hub.clone();
    let write_timeout = state.write_timeout;
    Ok(upgrade.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        connection::serve(hub, topic_id, sink, stream, write_timeout).await;
    }))
}

