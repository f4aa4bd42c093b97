//! Account endpoints: POST /register, POST /login.
//!
//! Login only checks credentials; no session or token is issued.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use taskpush_users::UserError;
use tracing::error;

use super::response::{fail, ok, server_error, ApiError, ApiMessage};
use crate::app::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// POST /register
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<ApiMessage>, ApiError> {
    // argon2 is CPU-bound; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        state.users.register(&creds.username, &creds.password)
    })
    .await
    .map_err(|e| {
        error!("register task failed: {e}");
        server_error()
    })?;

    match result {
        Ok(_) => Ok(ok("User registered")),
        Err(UserError::AlreadyExists(_)) => {
            Err(fail(StatusCode::CONFLICT, "Username already exists"))
        }
        Err(UserError::InvalidInput(msg)) => Err(fail(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            error!(error = %e, "POST /register failed");
            Err(server_error())
        }
    }
}

/// POST /login
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<ApiMessage>, ApiError> {
    let result =
        tokio::task::spawn_blocking(move || state.users.login(&creds.username, &creds.password))
            .await
            .map_err(|e| {
                error!("login task failed: {e}");
                server_error()
            })?;

    match result {
        Ok(_) => Ok(ok("Login successful")),
        Err(UserError::NotFound(_)) => Err(fail(StatusCode::NOT_FOUND, "User not found")),
        Err(UserError::IncorrectPassword) => {
            Err(fail(StatusCode::UNAUTHORIZED, "Incorrect password"))
        }
        Err(e) => {
            error!(error = %e, "POST /login failed");
            Err(server_error())
        }
    }
}
