//! Guestbook: file-backed entries with input validation and pagination.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;
use crate::response::{Created, Json};
use crate::status::Status;
use crate::store::Record;

use super::{named_not_found, AppState};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Record for Entry {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
struct EntryCreate {
    name: String,
    message: String,
}

#[derive(Deserialize)]
struct EntryUpdate {
    message: Option<String>,
}

fn positive(req: &Request, key: &str, default: usize) -> Result<usize, ApiError> {
    match req.query(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ApiError::BadRequest(format!("`{key}` must be a positive integer"))),
        },
    }
}

/// GET /api/entries?page=1&limit=5 — a page of the collection, in
/// insertion order. A page past the end is an empty list, not an error.
pub async fn list(state: Arc<AppState>, req: Request) -> Result<Json<Vec<Entry>>, ApiError> {
    let page = positive(&req, "page", 1)?;
    let limit = positive(&req, "limit", 5)?;
    let entries = state.entries.list().await?;
    // Saturating arithmetic: an absurdly large page is an empty page, not
    // an overflow panic.
    let page = entries
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(limit))
        .take(limit)
        .collect();
    Ok(Json(page))
}

/// POST /api/entries → 201. Blank names and messages are rejected;
/// surrounding whitespace never reaches the collection.
pub async fn create(state: Arc<AppState>, req: Request) -> Result<Created<Entry>, ApiError> {
    let payload: EntryCreate = req.json()?;
    let name = payload.name.trim().to_owned();
    let message = payload.message.trim().to_owned();
    if name.is_empty() || message.is_empty() {
        return Err(ApiError::BadRequest("Name and message must not be empty".into()));
    }
    let entry = state
        .entries
        .create(Box::new(move |id| Entry { id, name, message, timestamp: Utc::now() }))
        .await?;
    Ok(Created(entry))
}

/// PUT /api/entries/{id} — rewrites the message when one is provided.
pub async fn update(state: Arc<AppState>, req: Request) -> Result<Json<Entry>, ApiError> {
    let id = req.require_param("id")?;
    let payload: EntryUpdate = req.json()?;
    let entry = state
        .entries
        .update(
            id,
            Box::new(move |e| {
                if let Some(message) = payload.message {
                    e.message = message.trim().to_owned();
                }
            }),
        )
        .await
        .map_err(|e| named_not_found(e, "Entry"))?;
    Ok(Json(entry))
}

/// DELETE /api/entries/{id} → 204
pub async fn delete(state: Arc<AppState>, req: Request) -> Result<Status, ApiError> {
    let id = req.require_param("id")?;
    state
        .entries
        .delete(id)
        .await
        .map_err(|e| named_not_found(e, "Entry"))?;
    Ok(Status::NoContent)
}
