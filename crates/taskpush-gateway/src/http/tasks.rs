//! Task CRUD: POST /task, GET /tasks, DELETE /task/{id}.
//!
//! `day` uses the shared weekday encoding (0 = Monday … 6 = Sunday); anything
//! else is rejected here so the sweep never sees an unmatched day.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskpush_core::DayOfWeek;
use taskpush_tasks::{Task, TaskStoreError};
use tracing::{error, warn};

use super::response::{fail, ok, server_error, ApiError, ApiMessage};
use crate::app::AppState;

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub day: i64,
    pub name: String,
    pub time: String,
}

#[derive(Serialize)]
pub struct TaskSaved {
    pub success: bool,
    pub message: String,
    pub task: Task,
}

#[derive(Serialize)]
pub struct TaskList {
    pub success: bool,
    pub tasks: Vec<Task>,
}

/// POST /task
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<TaskSaved>, ApiError> {
    let day = DayOfWeek::try_from(req.day).map_err(|e| {
        warn!(day = req.day, "rejected task with invalid day");
        fail(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    match state.tasks.create_task(day, &req.name, &req.time) {
        Ok(task) => Ok(Json(TaskSaved {
            success: true,
            message: "Task saved".to_string(),
            task,
        })),
        Err(TaskStoreError::InvalidTask(msg)) => Err(fail(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            error!(error = %e, "POST /task failed");
            Err(fail(StatusCode::INTERNAL_SERVER_ERROR, "Error saving task"))
        }
    }
}

/// GET /tasks
pub async fn list_tasks_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TaskList>, ApiError> {
    match state.tasks.list_tasks() {
        Ok(tasks) => Ok(Json(TaskList {
            success: true,
            tasks,
        })),
        Err(e) => {
            error!(error = %e, "GET /tasks failed");
            Err(fail(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching tasks"))
        }
    }
}

/// DELETE /task/{id}
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, ApiError> {
    match state.tasks.delete_task(&id) {
        Ok(()) => Ok(ok("Task deleted")),
        Err(TaskStoreError::NotFound { .. }) => Err(fail(StatusCode::NOT_FOUND, "Task not found")),
        Err(e) => {
            error!(task_id = %id, error = %e, "DELETE /task failed");
            Err(server_error())
        }
    }
}
