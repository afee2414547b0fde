use std::sync::Arc;
use std::time::Duration;

use agora_core::identity::IdentityVerifier;
use agora_core::store::{CategoryStore, MessageStore, TopicStore};

use crate::services::{CategoryService, MessageService, TopicService};
use crate::ws::{Hub, WRITE_TIMEOUT};

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryService>,
    pub topics: Arc<TopicService>,
    pub messages: Arc<MessageService>,
    pub hub: Arc<Hub>,
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Deadline for a single WebSocket frame write.
    pub write_timeout: Duration,
    /// Present in production; `None` when running on in-memory stores.
    pub pool: Option<agora_db::DbPool>,
}

impl AppState {
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        topics: Arc<dyn TopicStore>,
        messages: Arc<dyn MessageStore>,
        verifier: Arc<dyn IdentityVerifier>,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            categories: Arc::new(CategoryService::new(
                Arc::clone(&categories),
                Arc::clone(&topics),
                Arc::clone(&hub),
            )),
            topics: Arc::new(TopicService::new(Arc::clone(&topics), categories, Arc::clone(&hub))),
            messages: Arc::new(MessageService::new(messages, topics, Arc::clone(&hub))),
            hub,
            verifier,
            write_timeout: WRITE_TIMEOUT,
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: agora_db::DbPool) -> Self {
        self.pool = Some(pool);
        self
    }
}
