//! `taskpush-push`: push subscriptions and notification delivery.
//!
//! * [`registry`] holds the process-lifetime list of browser subscriptions.
//! * [`dispatcher`] defines the delivery seam used by the reminder sweep.
//! * [`webpush`] implements it against real push services (RFC 8030) with
//!   `aes128gcm` payload encryption (RFC 8291) and VAPID auth (RFC 8292).

pub mod dispatcher;
pub mod ece;
pub mod error;
pub mod registry;
pub mod types;
pub mod vapid;
pub mod webpush;

pub use dispatcher::{Dispatcher, NullDispatcher};
pub use error::{DispatchError, Result};
pub use registry::{InMemorySubscriptionRegistry, SubscriptionRegistry};
pub use types::{Subscription, SubscriptionKeys};
pub use vapid::VapidSigner;
pub use webpush::WebPushDispatcher;
