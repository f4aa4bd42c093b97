use thiserror::Error;

/// Errors that abort a whole tick. Per-delivery failures never surface here.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Reading the task set failed; the next tick retries on its own.
    #[error("Task store read failed: {0}")]
    StoreRead(#[from] taskpush_tasks::TaskStoreError),

    /// Settings could not be turned into a runnable sweep.
    #[error("Invalid sweep settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, SweepError>;
