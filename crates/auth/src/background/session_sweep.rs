//! Periodic removal of expired sessions.
//!
//! The job itself is unbounded; [`agora_core::cleanup::CleanupScheduler`]
//! applies the run timeout and cancellation.

use std::sync::Arc;

use agora_core::cleanup::CleanupJob;
use agora_core::error::CoreResult;
use async_trait::async_trait;

use crate::sessions::SessionManager;

pub struct SessionSweep {
    sessions: Arc<SessionManager>,
}

impl SessionSweep {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl CleanupJob for SessionSweep {
    fn name(&self) -> &'static str {
        "session_sweep"
    }

    async fn run(&self) -> CoreResult<u64> {
        self.sessions.sweep_expired().await
    }
}
