use thiserror::Error;

/// Errors that can occur within the task store.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No task with the given ID exists in the store.
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// The task failed validation before it reached the database.
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A stored row could not be mapped back to a task.
    #[error("Corrupt task row {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, TaskStoreError>;
