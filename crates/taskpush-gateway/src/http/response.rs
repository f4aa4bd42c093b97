//! `{success, message}` envelope shared by every JSON route.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ApiMessage>);

pub fn ok(message: &str) -> Json<ApiMessage> {
    Json(ApiMessage {
        success: true,
        message: message.to_string(),
    })
}

pub fn fail(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ApiMessage {
            success: false,
            message: message.into(),
        }),
    )
}

pub fn server_error() -> ApiError {
    fail(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}
