use tracing::error;

/// Run a blocking closure on the tokio blocking pool
///
/// # Panics
///
/// Resumes the closure's panic, and panics if the task was cancelled by a runtime shutdown
pub async fn run_blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
        Err(error) => {
            error!("blocking task failed: {error}");
            panic!("blocking task was cancelled: {error}")
        }
    }
}
