use async_trait::async_trait;
use taskpush_core::ReminderPayload;

use crate::error::{DispatchError, Result};
use crate::types::Subscription;

/// Delivers one payload to one subscription.
///
/// Implementations report each attempt independently; callers decide how to
/// bound, fan out and log them.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &str;

    /// `false` when every delivery would fail for lack of configuration.
    fn is_configured(&self) -> bool {
        true
    }

    async fn deliver(&self, subscription: &Subscription, payload: &ReminderPayload) -> Result<()>;
}

/// Placeholder dispatcher when no VAPID keys are available.
pub struct NullDispatcher;

#[async_trait]
impl Dispatcher for NullDispatcher {
    fn name(&self) -> &str {
        "null"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn deliver(&self, _subscription: &Subscription, _payload: &ReminderPayload) -> Result<()> {
        Err(DispatchError::Unconfigured)
    }
}
