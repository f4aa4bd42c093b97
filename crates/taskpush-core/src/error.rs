use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskpushError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Weekday index outside the 0 (Monday) … 6 (Sunday) encoding.
    #[error("Invalid day: {0} (expected 0 = Monday … 6 = Sunday)")]
    InvalidDay(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskpushError {
    /// Short error code string, stable across releases for client matching.
    pub fn code(&self) -> &'static str {
        match self {
            TaskpushError::Config(_) => "CONFIG_ERROR",
            TaskpushError::InvalidDay(_) => "INVALID_DAY",
            TaskpushError::Serialization(_) => "SERIALIZATION_ERROR",
            TaskpushError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskpushError>;
