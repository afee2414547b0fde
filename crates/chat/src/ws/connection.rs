//! Lifecycle of one subscriber connection.
//!
//! A connection runs two loops. The read loop only watches for the peer
//! going away; inbound frames carry nothing. The write loop drains the
//! delivery queue into the socket, one JSON text frame per event, each
//! bounded by a write deadline.
//!
//! Teardown happens in one place, after either loop ends: the connection is
//! unregistered (closing its queue) and the writer is allowed to finish.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use agora_core::chat::WsEvent;
use agora_core::types::DbId;
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;

use super::hub::{ConnectionKey, Hub};

/// Register with `hub` under `topic_id` and serve the socket until it closes.
///
/// `sink` and `stream` are the two halves of the transport, typically from
/// `WebSocket::split`.
pub async fn serve<Tx, Rx, E>(
    hub: Arc<Hub>,
    topic_id: DbId,
    sink: Tx,
    stream: Rx,
    write_timeout: Duration,
) where
    Tx: Sink<Message> + Unpin + Send + 'static,
    Tx::Error: Display + Send,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let sub = hub.register(topic_id).await;
    let key = sub.key;
    tracing::info!(topic_id, conn_id = %key.conn_id, "Subscriber connected");

    let mut writer = tokio::spawn(write_loop(sink, sub.events, write_timeout, key));

    let writer_done = tokio::select! {
        _ = read_loop(stream, key) => false,
        _ = &mut writer => true,
    };

    hub.unregister(&key).await;
    if !writer_done {
        // Queue is closed now; the writer flushes what is left and stops.
        let _ = writer.await;
    }

    tracing::info!(topic_id, conn_id = %key.conn_id, "Subscriber disconnected");
}

async fn read_loop<Rx, E>(mut stream: Rx, key: ConnectionKey)
where
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                tracing::trace!(conn_id = %key.conn_id, "Inbound frame ignored");
            }
            Err(e) => {
                tracing::debug!(conn_id = %key.conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }
}

async fn write_loop<Tx>(
    mut sink: Tx,
    mut events: mpsc::Receiver<WsEvent>,
    write_timeout: Duration,
    key: ConnectionKey,
) where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
{
    while let Some(event) = events.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(conn_id = %key.conn_id, error = %e, "Failed to encode event");
                continue;
            }
        };

        match tokio::time::timeout(write_timeout, sink.send(Message::Text(text.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(conn_id = %key.conn_id, error = %e, "WebSocket send failed");
                break;
            }
            Err(_) => {
                tracing::warn!(
                    conn_id = %key.conn_id,
                    timeout_ms = write_timeout.as_millis() as u64,
                    "WebSocket write deadline exceeded"
                );
                break;
            }
        }
    }

    let _ = tokio::time::timeout(write_timeout, sink.close()).await;
}
