//! Handlers for the task CRUD endpoints.
//!
//! Routing table (all responses use the `{data, error, message}` envelope):
//!
//! ```text
//! GET    /tasks        list_tasks
//! POST   /tasks        add_task
//! PUT    /tasks        update_task
//! GET    /tasks/{id}   get_task
//! DELETE /tasks/{id}   delete_task
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use tasks_core::{Task, TaskId};

use crate::error::{AppError, AppResult};
use crate::response::{self, ApiStatus};
use crate::state::AppState;

/// Body for POST /tasks. Any `id` field a client sends is dropped during
/// deserialization; the store assigns ids on the create path.
#[derive(Debug, Deserialize)]
pub struct NewTaskBody {
    pub description: String,
    pub deadline: DateTime<Utc>,
}

/// Parse a path segment as a task id. Anything that is not an unsigned
/// integer is a client error.
fn parse_id(raw: &str) -> Result<TaskId, AppError> {
    // u64::from_str accepts a leading '+', which is not a valid id.
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!("invalid task id {raw:?}")));
    }
    raw.parse::<TaskId>()
        .map_err(|err| AppError::BadRequest(format!("invalid task id {raw:?}: {err}")))
}

/// Turn a JSON body rejection into a 400 with the rejection's own text.
fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

/// GET /tasks -- all stored tasks, in undefined order.
pub async fn list_tasks(State(state): State<AppState>) -> AppResult<Json<ApiStatus<Vec<Task>>>> {
    let all = state.tasks.get_all().await?;
    tracing::debug!(count = all.len(), "listed tasks");
    Ok(response::success(all))
}

/// GET /tasks/{id} -- a single task.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiStatus<Task>>> {
    let id = parse_id(&id)?;
    let task = state.tasks.get_by_id(id).await?;
    Ok(response::success(task))
}

/// POST /tasks -- create a task from description and deadline.
pub async fn add_task(
    State(state): State<AppState>,
    body: Result<Json<NewTaskBody>, JsonRejection>,
) -> AppResult<Json<ApiStatus<Task>>> {
    let Json(body) = body.map_err(bad_body)?;
    let created = state.tasks.new_task(body.description, body.deadline).await?;
    tracing::info!(id = created.id, "created task");
    Ok(response::success(created))
}

/// PUT /tasks -- update the task identified by the body's own `id`.
///
/// The full task is required, `id` included; a body without an id is a
/// malformed request rather than an update of id 0.
pub async fn update_task(
    State(state): State<AppState>,
    body: Result<Json<Task>, JsonRejection>,
) -> AppResult<Json<ApiStatus<Task>>> {
    let Json(task) = body.map_err(bad_body)?;
    let updated = state.tasks.update(&task).await?;
    tracing::info!(id = updated.id, "updated task");
    Ok(response::success(updated))
}

/// DELETE /tasks/{id} -- delete a task, returning its last stored value.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiStatus<Task>>> {
    let id = parse_id(&id)?;
    let deleted = state.tasks.delete_by_id(id).await?;
    tracing::info!(id = deleted.id, "deleted task");
    Ok(response::success(deleted))
}
