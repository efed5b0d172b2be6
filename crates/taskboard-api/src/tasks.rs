// Task CRUD HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use taskboard_contracts::{
    CreateTaskRequest, DeleteTaskResponse, ErrorResponse, Task, UpdateTaskRequest,
};
use taskboard_storage::{
    models::{CreateTask, UpdateTask},
    Database,
};

use crate::services::TaskService;

/// App state for task routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TaskService>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            service: Arc::new(TaskService::new(db)),
        }
    }
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: &str) -> ErrorReply {
    (status, Json(ErrorResponse::new(message)))
}

/// Create task routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/tasks", post(create_task).get(list_tasks))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(state)
}

/// GET /api/tasks - List all tasks, newest first
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "All tasks ordered by creation time descending", body = [Task]),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ErrorReply> {
    let tasks = state.service.list().await.map_err(|e| {
        tracing::error!("Error fetching tasks: {}", e);
        error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch tasks")
    })?;

    Ok(Json(tasks))
}

/// GET /api/tasks/{id} - Get task by ID
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Task>, ErrorReply> {
    let task = state
        .service
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Error fetching task: {}", e);
            error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch task")
        })?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Task not found"))?;

    Ok(Json(task))
}

/// POST /api/tasks - Create a new task
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, description = "Missing or empty title", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ErrorReply> {
    // Title is enforced here at the boundary, not by the store.
    let title = match req.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(error(StatusCode::BAD_REQUEST, "Title is required")),
    };

    let input = CreateTask {
        title,
        description: req.description.unwrap_or_default(),
        status: req.status.unwrap_or_else(|| "pending".to_string()),
    };

    let task = state.service.create(input).await.map_err(|e| {
        tracing::error!("Error creating task: {}", e);
        error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create task")
    })?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id} - Overwrite a task's mutable fields
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ErrorReply> {
    // Full overwrite: omitted fields are written as NULL, not left alone.
    let input = UpdateTask {
        title: req.title,
        description: req.description,
        status: req.status,
    };

    let task = state
        .service
        .update(id, input)
        .await
        .map_err(|e| {
            tracing::error!("Error updating task: {}", e);
            error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update task")
        })?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Task not found"))?;

    Ok(Json(task))
}

/// DELETE /api/tasks/{id} - Delete a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task deleted successfully", body = DeleteTaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteTaskResponse>, ErrorReply> {
    let deleted = state.service.delete(id).await.map_err(|e| {
        tracing::error!("Error deleting task: {}", e);
        error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete task")
    })?;

    if deleted {
        Ok(Json(DeleteTaskResponse {
            message: "Task deleted successfully".to_string(),
        }))
    } else {
        Err(error(StatusCode::NOT_FOUND, "Task not found"))
    }
}
