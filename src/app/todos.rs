//! To-do list: the plainest CRUD resource, memory-backed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;
use crate::response::{Created, Json};
use crate::status::Status;
use crate::store::Record;

use super::{named_not_found, AppState};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Todo {
    pub id: String,
    pub task: String,
    pub completed: bool,
}

impl Record for Todo {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
struct TodoPayload {
    task: String,
}

/// GET /api/todos
pub async fn list(state: Arc<AppState>, _req: Request) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.todos.list().await?))
}

/// POST /api/todos → 201
pub async fn create(state: Arc<AppState>, req: Request) -> Result<Created<Todo>, ApiError> {
    let payload: TodoPayload = req.json()?;
    let task = payload.task.trim().to_owned();
    if task.is_empty() {
        return Err(ApiError::BadRequest("Task must not be empty".into()));
    }
    let todo = state
        .todos
        .create(Box::new(move |id| Todo { id, task, completed: false }))
        .await?;
    Ok(Created(todo))
}

/// PATCH /api/todos/{id} — flips `completed`.
pub async fn toggle(state: Arc<AppState>, req: Request) -> Result<Json<Todo>, ApiError> {
    let id = req.require_param("id")?;
    let todo = state
        .todos
        .update(id, Box::new(|t| t.completed = !t.completed))
        .await
        .map_err(|e| named_not_found(e, "Todo"))?;
    Ok(Json(todo))
}

/// PUT /api/todos/{id} — replaces the task text.
pub async fn update(state: Arc<AppState>, req: Request) -> Result<Json<Todo>, ApiError> {
    let id = req.require_param("id")?;
    let payload: TodoPayload = req.json()?;
    let todo = state
        .todos
        .update(id, Box::new(move |t| t.task = payload.task))
        .await
        .map_err(|e| named_not_found(e, "Todo"))?;
    Ok(Json(todo))
}

/// DELETE /api/todos/{id} → 204
pub async fn delete(state: Arc<AppState>, req: Request) -> Result<Status, ApiError> {
    let id = req.require_param("id")?;
    state
        .todos
        .delete(id)
        .await
        .map_err(|e| named_not_found(e, "Todo"))?;
    Ok(Status::NoContent)
}

/// DELETE /api/todos/completed → 204 — bulk-removes finished items.
pub async fn delete_completed(state: Arc<AppState>, _req: Request) -> Result<Status, ApiError> {
    let finished: Vec<String> = state
        .todos
        .list()
        .await?
        .into_iter()
        .filter(|t| t.completed)
        .map(|t| t.id)
        .collect();
    for id in finished {
        state.todos.delete(&id).await?;
    }
    Ok(Status::NoContent)
}
