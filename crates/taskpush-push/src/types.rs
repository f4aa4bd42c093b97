use serde::{Deserialize, Serialize};

/// A browser `PushSubscription` as produced by `subscription.toJSON()`.
///
/// The registry and sweep treat this as an opaque token; only the Web Push
/// dispatcher looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}

/// Client key material, both base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Uncompressed P-256 public key of the user agent (65 bytes).
    pub p256dh: String,
    /// Authentication secret (16 bytes).
    pub auth: String,
}
