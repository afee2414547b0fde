//! Periodic cleanup of expired rows.
//!
//! A [`CleanupScheduler`] ticks on a fixed interval and runs every registered
//! [`CleanupJob`] under its own timeout. A failed or timed-out job is logged
//! and the next tick proceeds as usual. The loop exits when the
//! [`CancellationToken`] is triggered.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};

/// One unit of periodic cleanup work.
#[async_trait]
pub trait CleanupJob: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Perform one pass. Returns the number of rows removed.
    async fn run(&self) -> CoreResult<u64>;
}

/// Drive `fut` to completion unless `timeout` elapses or `cancel` fires.
///
/// Elapsed and cancelled runs surface as [`CoreError::DeadlineExceeded`] and
/// [`CoreError::Canceled`], distinct from errors reported by `fut` itself.
pub async fn with_deadline<T, F>(
    timeout: Duration,
    cancel: &CancellationToken,
    fut: F,
) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CoreError::Canceled),
        res = tokio::time::timeout(timeout, fut) => match res {
            Ok(inner) => inner,
            Err(_) => Err(CoreError::DeadlineExceeded),
        },
    }
}

/// Outcome of a single job within one tick.
#[derive(Debug)]
pub struct JobReport {
    pub job: &'static str,
    pub result: CoreResult<u64>,
}

pub struct CleanupScheduler {
    interval: Duration,
    timeout: Duration,
    jobs: Vec<Arc<dyn CleanupJob>>,
}

impl CleanupScheduler {
    /// `interval` between ticks; `timeout` bounds each job run.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            jobs: Vec::new(),
        }
    }

    pub fn with_job(mut self, job: Arc<dyn CleanupJob>) -> Self {
        self.jobs.push(job);
        self
    }

    /// Run every job once, sequentially, each under the configured timeout.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Vec<JobReport> {
        let mut reports = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            let result = with_deadline(self.timeout, cancel, job.run()).await;
            match &result {
                Ok(0) => tracing::debug!(job = job.name(), "Cleanup: nothing to purge"),
                Ok(deleted) => tracing::info!(job = job.name(), deleted, "Cleanup: purged rows"),
                Err(CoreError::Canceled) => {
                    tracing::info!(job = job.name(), "Cleanup: run canceled")
                }
                Err(e) => tracing::error!(job = job.name(), error = %e, "Cleanup: run failed"),
            }
            reports.push(JobReport {
                job: job.name(),
                result,
            });
        }
        reports
    }

    /// Tick until `cancel` is triggered. The first tick fires immediately.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            jobs = self.jobs.len(),
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            "Cleanup scheduler started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Cleanup scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once(&cancel).await;
                }
            }
        }
    }
}
