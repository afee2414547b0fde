use agora_core::error::{CoreError, CoreResult};

/// Run CPU-bound work (password hashing) off the async worker threads.
pub(crate) async fn run<T, F>(f: F) -> CoreResult<T>
where
    F: FnOnce() -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::Internal(format!("blocking task failed: {e}")))?
}
