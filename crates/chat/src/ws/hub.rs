//! Topic-keyed registry of live connections.

use std::collections::HashMap;

use agora_core::chat::WsEvent;
use agora_core::types::DbId;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

const SHARD_COUNT: usize = 16;

type Subscribers = HashMap<Uuid, mpsc::Sender<WsEvent>>;
type Shard = RwLock<HashMap<DbId, Subscribers>>;

/// Identifies one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub topic_id: DbId,
    pub conn_id: Uuid,
}

/// Handle returned by [`Hub::register`].
///
/// `events` yields every event published to the topic until the connection
/// is unregistered, at which point it drains and then returns `None`.
pub struct Subscription {
    pub key: ConnectionKey,
    pub events: mpsc::Receiver<WsEvent>,
}

/// Fan-out hub.
///
/// Connections are grouped by topic and the topics are spread over a fixed
/// number of shards, each behind its own `RwLock`. Publishing takes a read
/// lock on one shard; registering and unregistering take a write lock.
///
/// The hub holds the only sender of every delivery queue, so removing a
/// connection from the registry is what closes its queue.
pub struct Hub {
    shards: Vec<Shard>,
    capacity: usize,
}

impl Hub {
    /// `capacity` bounds each connection's delivery queue (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| RwLock::default()).collect(),
            capacity: capacity.max(1),
        }
    }

    fn shard(&self, topic_id: DbId) -> &Shard {
        &self.shards[topic_id.rem_euclid(SHARD_COUNT as DbId) as usize]
    }

    /// Add a new connection to `topic_id`.
    pub async fn register(&self, topic_id: DbId) -> Subscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let key = ConnectionKey {
            topic_id,
            conn_id: Uuid::new_v4(),
        };

        self.shard(topic_id)
            .write()
            .await
            .entry(topic_id)
            .or_default()
            .insert(key.conn_id, tx);

        tracing::debug!(topic_id, conn_id = %key.conn_id, "Connection registered");
        Subscription { key, events: rx }
    }

    /// Remove a connection and close its queue.
    ///
    /// Returns `false` when the connection was already gone, so calling this
    /// twice is harmless.
    pub async fn unregister(&self, key: &ConnectionKey) -> bool {
        let mut shard = self.shard(key.topic_id).write().await;
        let Some(subscribers) = shard.get_mut(&key.topic_id) else {
            return false;
        };
        let removed = subscribers.remove(&key.conn_id).is_some();
        if subscribers.is_empty() {
            shard.remove(&key.topic_id);
        }
        if removed {
            tracing::debug!(topic_id = key.topic_id, conn_id = %key.conn_id, "Connection unregistered");
        }
        removed
    }

    /// Offer `event` to every subscriber of `topic_id` without waiting.
    ///
    /// A subscriber whose queue is full misses this event. Returns the
    /// number of queues that accepted it.
    pub async fn publish(&self, topic_id: DbId, event: WsEvent) -> usize {
        let shard = self.shard(topic_id).read().await;
        let Some(subscribers) = shard.get(&topic_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (conn_id, tx) in subscribers {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(topic_id, conn_id = %conn_id, "Delivery queue full, event dropped");
                }
                // Receiver already gone; the connection is mid-teardown.
                Err(TrySendError::Closed(_)) => {}
            }
        }

        tracing::debug!(
            topic_id,
            message_id = event.message_id(),
            delivered,
            subscribers = subscribers.len(),
            "Event published"
        );
        delivered
    }

    /// Total number of registered connections across all topics.
    pub async fn connection_count(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.read().await.values().map(HashMap::len).sum::<usize>();
        }
        total
    }

    pub async fn subscriber_count(&self, topic_id: DbId) -> usize {
        self.shard(topic_id)
            .read()
            .await
            .get(&topic_id)
            .map_or(0, HashMap::len)
    }

    /// Drop every connection to `topic_id`, e.g. once the topic is deleted.
    pub async fn close_topic(&self, topic_id: DbId) -> usize {
        let closed = self
            .shard(topic_id)
            .write()
            .await
            .remove(&topic_id)
            .map_or(0, |subscribers| subscribers.len());
        if closed > 0 {
            tracing::info!(topic_id, count = closed, "Closed topic subscriber queues");
        }
        closed
    }

    /// Drop every connection. Write loops drain what is queued and exit.
    pub async fn shutdown_all(&self) -> usize {
        let mut closed = 0;
        for shard in &self.shards {
            let mut shard = shard.write().await;
            closed += shard.values().map(HashMap::len).sum::<usize>();
            shard.clear();
        }
        tracing::info!(count = closed, "Closed all subscriber queues");
        closed
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(super::DEFAULT_QUEUE_CAPACITY)
    }
}
