//! Push subscription endpoints: POST /subscribe, GET /push/public-key.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use taskpush_push::Subscription;
use tracing::info;

use super::response::{fail, ApiError};
use crate::app::AppState;

/// POST /subscribe: body is the browser's `PushSubscription.toJSON()`.
pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Json(subscription): Json<Subscription>,
) -> (StatusCode, Json<Value>) {
    info!(endpoint = %subscription.endpoint, "push subscription received");
    state.subscriptions.register(subscription);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Subscribed successfully" })),
    )
}

/// GET /push/public-key: `applicationServerKey` for `pushManager.subscribe`.
pub async fn public_key_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    match &state.vapid_public_key {
        Some(key) => Ok(Json(json!({ "publicKey": key }))),
        None => Err(fail(
            StatusCode::NOT_FOUND,
            "Push notifications are not configured",
        )),
    }
}
