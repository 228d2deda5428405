//! Polls: file-backed, with the option-count rule enforced before
//! anything touches the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;
use crate::response::{Created, Json};
use crate::store::Record;

use super::{named_not_found, AppState};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PollOption {
    pub label: String,
    pub votes: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub options: Vec<PollOption>,
}

impl Record for Poll {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
struct CreatePoll {
    question: String,
    options: Vec<String>,
}

/// GET /api/poll/latest — the most recently created poll.
pub async fn latest(state: Arc<AppState>, _req: Request) -> Result<Json<Poll>, ApiError> {
    state
        .polls
        .list()
        .await?
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No polls yet".into()))
}

/// POST /api/poll/create → 201. Fewer than two options is a 400, and
/// nothing is persisted.
pub async fn create(state: Arc<AppState>, req: Request) -> Result<Created<Poll>, ApiError> {
    let payload: CreatePoll = req.json()?;
    if payload.options.len() < 2 {
        return Err(ApiError::BadRequest("A poll needs at least two options".into()));
    }
    let poll = state
        .polls
        .create(Box::new(move |id| Poll {
            id,
            question: payload.question,
            options: payload
                .options
                .into_iter()
                .map(|label| PollOption { label, votes: 0 })
                .collect(),
        }))
        .await?;
    Ok(Created(poll))
}

/// POST /api/poll/vote/{poll_id}/{option} — bumps one option's count.
pub async fn vote(state: Arc<AppState>, req: Request) -> Result<Json<Poll>, ApiError> {
    let poll_id = req.require_param("poll_id")?;
    let option = req.require_param("option")?.to_owned();

    // Existence checks first so "no such poll" and "no such option" stay
    // distinguishable; the increment itself re-finds the option.
    let poll = state
        .polls
        .get(poll_id)
        .await
        .map_err(|e| named_not_found(e, "Poll"))?;
    if !poll.options.iter().any(|o| o.label == option) {
        return Err(ApiError::NotFound("Option not found".into()));
    }

    let updated = state
        .polls
        .update(
            poll_id,
            Box::new(move |p| {
                if let Some(o) = p.options.iter_mut().find(|o| o.label == option) {
                    o.votes += 1;
                }
            }),
        )
        .await
        .map_err(|e| named_not_found(e, "Poll"))?;
    Ok(Json(updated))
}
