use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tasks": state.tasks.list_tasks().ok().map(|tasks| tasks.len()),
        "subscriptions": state.subscriptions.len(),
        "push_configured": state.vapid_public_key.is_some(),
        "sweep_interval_secs": state.config.reminders.interval_secs,
    }))
}
