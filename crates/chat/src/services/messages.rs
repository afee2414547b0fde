//! Message history and live fan-out.
//!
//! Every successful write is followed by a publish to the topic's live
//! subscribers. Publishing is best effort: a subscriber that is not
//! connected, or whose queue is full, simply does not see the event.

use std::sync::Arc;
use std::time::Duration;

use agora_core::chat::{CreateMessage, Message, WsEvent};
use agora_core::cleanup::with_deadline;
use agora_core::error::{CoreError, CoreResult};
use agora_core::roles::Principal;
use agora_core::store::{MessageStore, TopicStore};
use agora_core::types::{DbId, Timestamp};
use tokio_util::sync::CancellationToken;

use crate::ws::Hub;

pub struct MessageService {
    messages: Arc<dyn MessageStore>,
    topics: Arc<dyn TopicStore>,
    hub: Arc<Hub>,
}

impl MessageService {
    pub fn new(messages: Arc<dyn MessageStore>, topics: Arc<dyn TopicStore>, hub: Arc<Hub>) -> Self {
        Self {
            messages,
            topics,
            hub,
        }
    }

    /// History of a topic, oldest first. NotFound when the topic is missing.
    pub async fn list_by_topic(&self, topic_id: DbId) -> CoreResult<Vec<Message>> {
        self.topics
            .get(topic_id)
            .await
            .map_err(|e| e.context("message.list: get topic"))?;
        self.messages
            .list_by_topic(topic_id)
            .await
            .map_err(|e| e.context("message.list"))
    }

    pub async fn send(&self, caller: Principal, topic_id: DbId, content: &str) -> CoreResult<Message> {
        let content = non_empty(content)?;
        self.topics
            .get(topic_id)
            .await
            .map_err(|e| e.context("message.send: get topic"))?;

        let message = self
            .messages
            .create(CreateMessage {
                topic_id,
                author_id: caller.user_id,
                content,
            })
            .await
            .map_err(|e| e.context("message.send"))?;
        tracing::info!(message_id = message.id, topic_id, user_id = caller.user_id, "Message sent");

        self.hub
            .publish(
                topic_id,
                WsEvent::Created {
                    message: message.clone(),
                },
            )
            .await;
        Ok(message)
    }

    /// Only the author may edit a message.
    pub async fn update(&self, caller: Principal, id: DbId, content: &str) -> CoreResult<Message> {
        let content = non_empty(content)?;
        let existing = self
            .messages
            .get(id)
            .await
            .map_err(|e| e.context("message.update: get"))?;
        if existing.author_id != caller.user_id {
            tracing::warn!(message_id = id, user_id = caller.user_id, "Message edit rejected: not the author");
            return Err(CoreError::Forbidden("Only the author can edit this message".into()));
        }

        let message = self
            .messages
            .update(id, &content)
            .await
            .map_err(|e| e.context("message.update"))?;
        tracing::info!(message_id = id, user_id = caller.user_id, "Message updated");

        self.hub
            .publish(
                message.topic_id,
                WsEvent::Updated {
                    message: message.clone(),
                },
            )
            .await;
        Ok(message)
    }

    /// Author or admin.
    pub async fn delete(&self, caller: Principal, id: DbId) -> CoreResult<()> {
        let existing = self
            .messages
            .get(id)
            .await
            .map_err(|e| e.context("message.delete: get"))?;
        caller.require_owner_or_admin(existing.author_id)?;

        self.messages
            .delete(id)
            .await
            .map_err(|e| e.context("message.delete"))?;
        tracing::info!(message_id = id, user_id = caller.user_id, "Message deleted");

        self.hub
            .publish(existing.topic_id, WsEvent::Deleted { message_id: id })
            .await;
        Ok(())
    }

    /// Purge messages created before `threshold`. Unbounded; the caller owns
    /// the deadline.
    pub async fn purge_older_than(&self, threshold: Timestamp) -> CoreResult<u64> {
        tracing::debug!(%threshold, "message.purge_older_than called");
        let removed = self
            .messages
            .delete_older_than(threshold)
            .await
            .map_err(|e| e.context("message.purge_older_than"))?;
        tracing::info!(removed, "Old messages deleted");
        Ok(removed)
    }

    /// [`Self::purge_older_than`] bounded by `timeout` and `cancel`.
    pub async fn delete_older_than(
        &self,
        threshold: Timestamp,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> CoreResult<u64> {
        with_deadline(timeout, cancel, self.purge_older_than(threshold))
            .await
            .map_err(|e| e.context("message.delete_older_than"))
    }
}

fn non_empty(content: &str) -> CoreResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Message content must not be empty".into()));
    }
    Ok(trimmed.to_string())
}
