//! Chat domain: categories, topics, messages, and the events pushed to
//! live subscribers.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: DbId,
    pub category_id: DbId,
    pub title: String,
    pub description: String,
    pub author_id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateTopic {
    pub category_id: DbId,
    pub title: String,
    pub description: String,
    pub author_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: DbId,
    pub topic_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub topic_id: DbId,
    pub author_id: DbId,
    pub content: String,
}

/// Event delivered to every live subscriber of a topic.
///
/// Serialized as `{"action": "created", "message": {...}}` or
/// `{"action": "deleted", "message_id": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum WsEvent {
    Created { message: Message },
    Updated { message: Message },
    Deleted { message_id: DbId },
}

impl WsEvent {
    /// Id of the message this event refers to.
    pub fn message_id(&self) -> DbId {
        match self {
            WsEvent::Created { message } | WsEvent::Updated { message } => message.id,
            WsEvent::Deleted { message_id } => *message_id,
        }
    }
}
