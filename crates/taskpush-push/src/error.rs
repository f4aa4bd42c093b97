use thiserror::Error;

/// Why a single delivery attempt failed. Never retried within a tick.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Subscription keys or endpoint could not be decoded.
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),

    /// Payload encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// VAPID key material or JWT signing failed.
    #[error("VAPID error: {0}")]
    Vapid(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The push service answered with a non-success status.
    #[error("Push service rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// 404/410: the subscription has expired or been unsubscribed.
    #[error("Subscription gone ({status})")]
    Gone { status: u16 },

    #[error("Delivery timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// No VAPID keys configured; nothing can be delivered.
    #[error("Push delivery is not configured")]
    Unconfigured,
}

pub type Result<T> = std::result::Result<T, DispatchError>;
