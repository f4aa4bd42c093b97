use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use taskpush_core::config::TaskpushConfig;
use taskpush_push::SubscriptionRegistry;
use taskpush_tasks::TaskStore;
use taskpush_users::UserStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::http;

/// Central shared state: passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: TaskpushConfig,
    pub users: UserStore,
    pub tasks: Arc<dyn TaskStore>,
    /// Shared with the reminder sweep; registrations are visible on its next tick.
    pub subscriptions: Arc<dyn SubscriptionRegistry>,
    /// base64url VAPID public key, `None` when web push is not configured.
    pub vapid_public_key: Option<String>,
}

impl AppState {
    pub fn new(
        config: TaskpushConfig,
        users: UserStore,
        tasks: Arc<dyn TaskStore>,
        subscriptions: Arc<dyn SubscriptionRegistry>,
        vapid_public_key: Option<String>,
    ) -> Self {
        Self {
            config,
            users,
            tasks,
            subscriptions,
            vapid_public_key,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    Router::new()
        .route("/health", get(http::health::health_handler))
        .route("/register", post(http::auth::register_handler))
        .route("/login", post(http::auth::login_handler))
        .route("/task", post(http::tasks::create_task_handler))
        .route("/task/{id}", delete(http::tasks::delete_task_handler))
        .route("/tasks", get(http::tasks::list_tasks_handler))
        .route("/subscribe", post(http::push::subscribe_handler))
        .route("/push/public-key", get(http::push::public_key_handler))
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Empty origin list = any origin (the browser client is usually served
/// from a different port during development).
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}
