//! Periodic removal of messages past the retention window.
//!
//! The job itself is unbounded; [`agora_core::cleanup::CleanupScheduler`]
//! applies the run timeout and cancellation.

use std::sync::Arc;
use std::time::Duration;

use agora_core::cleanup::CleanupJob;
use agora_core::error::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::Utc;

use crate::services::MessageService;

pub struct MessagePurge {
    messages: Arc<MessageService>,
    retention: Duration,
}

impl MessagePurge {
    pub fn new(messages: Arc<MessageService>, retention: Duration) -> Self {
        Self {
            messages,
            retention,
        }
    }
}

#[async_trait]
impl CleanupJob for MessagePurge {
    fn name(&self) -> &'static str {
        "message_purge"
    }

    async fn run(&self) -> CoreResult<u64> {
        let retention = chrono::Duration::from_std(self.retention)
            .map_err(|e| CoreError::Internal(format!("retention out of range: {e}")))?;
        self.messages.purge_older_than(Utc::now() - retention).await
    }
}
