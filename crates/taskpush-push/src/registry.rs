use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::types::Subscription;

/// Where subscribe requests land and where the sweep reads recipients from.
///
/// Injected as `Arc<dyn SubscriptionRegistry>` so a persistent backend can be
/// dropped in without touching the sweep.
pub trait SubscriptionRegistry: Send + Sync {
    /// Append a subscription. No dedup; duplicates receive duplicate pushes.
    fn register(&self, subscription: Subscription);

    /// Point-in-time snapshot. Registrations after the call are not included.
    fn list_all(&self) -> Vec<Arc<Subscription>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime registry. Lost on restart.
///
/// Readers clone the `Arc` list under a short read lock, so a sweep iterating
/// its snapshot never blocks or observes a concurrent `register`.
#[derive(Default)]
pub struct InMemorySubscriptionRegistry {
    subscriptions: RwLock<Vec<Arc<Subscription>>>,
}

impl InMemorySubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionRegistry for InMemorySubscriptionRegistry {
    fn register(&self, subscription: Subscription) {
        let mut subs = self.subscriptions.write().unwrap();
        debug!(endpoint = %subscription.endpoint, total = subs.len() + 1, "subscription registered");
        subs.push(Arc::new(subscription));
    }

    fn list_all(&self) -> Vec<Arc<Subscription>> {
        self.subscriptions.read().unwrap().clone()
    }

    fn len(&self) -> usize {
        self.subscriptions.read().unwrap().len()
    }
}
