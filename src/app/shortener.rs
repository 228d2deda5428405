//! URL shortener: memory-backed links with click stats and expiry.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;
use crate::response::{Created, Json, Response};
use crate::status::Status;
use crate::store::Record;

use super::AppState;

/// The record id doubles as the short code.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShortLink {
    pub id: String,
    pub long_url: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
}

impl Record for ShortLink {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
struct ShortenPayload {
    long_url: String,
    custom_code: Option<String>,
}

#[derive(Serialize)]
pub struct ShortenResponse {
    short_url: String,
    clicks: u64,
}

#[derive(Serialize)]
pub struct Stats {
    short_code: String,
    long_url: String,
    clicks: u64,
    created_at: DateTime<Utc>,
}

/// A code becomes a single path segment, so it must be non-empty and
/// URL-safe or the redirect route could never match it.
fn validate_code(code: &str) -> Result<(), ApiError> {
    let url_safe = !code.is_empty()
        && code.len() <= 32
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if url_safe {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "custom_code must be 1-32 characters: letters, digits, `-`, `_`".into(),
        ))
    }
}

fn validate_url(raw: &str) -> Result<String, ApiError> {
    let url = reqwest::Url::parse(raw)
        .map_err(|_| ApiError::BadRequest("long_url is not a valid URL".into()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ApiError::BadRequest("long_url must be http or https".into()));
    }
    Ok(url.to_string())
}

/// POST /api/shorten → 201. A taken custom code is a 409; generated
/// codes re-roll until free.
pub async fn create(state: Arc<AppState>, req: Request) -> Result<Created<ShortenResponse>, ApiError> {
    let payload: ShortenPayload = req.json()?;
    let long_url = validate_url(&payload.long_url)?;

    let code = match payload.custom_code {
        Some(code) => {
            validate_code(&code)?;
            if state.links.get(&code).await.is_ok() {
                return Err(ApiError::Conflict("Custom short code already taken".into()));
            }
            code
        }
        None => loop {
            let candidate = crate::id::short_code();
            if state.links.get(&candidate).await.is_err() {
                break candidate;
            }
        },
    };

    let link = state
        .links
        .create(Box::new(move |_assigned| ShortLink {
            id: code,
            long_url,
            clicks: 0,
            created_at: Utc::now(),
        }))
        .await?;

    Ok(Created(ShortenResponse {
        short_url: format!("{}/{}", state.config.public_base_url, link.id),
        clicks: link.clicks,
    }))
}

/// GET /{code} → 307 to the target. Expired and unknown codes are both
/// 404 — an expired link is gone, not forbidden.
pub async fn redirect(state: Arc<AppState>, req: Request) -> Result<Response, ApiError> {
    let code = req.require_param("code")?;
    let link = state
        .links
        .get(code)
        .await
        .map_err(|_| ApiError::NotFound("Short URL not found".into()))?;

    let lifetime = TimeDelta::from_std(state.config.short_link_lifetime).unwrap_or(TimeDelta::MAX);
    if Utc::now() - link.created_at > lifetime {
        return Err(ApiError::NotFound("Short URL has expired".into()));
    }

    let link = state
        .links
        .update(code, Box::new(|l| l.clicks += 1))
        .await?;
    Ok(Response::redirect(Status::TemporaryRedirect, &link.long_url))
}

/// GET /api/stats/{code}
pub async fn stats(state: Arc<AppState>, req: Request) -> Result<Json<Stats>, ApiError> {
    let code = req.require_param("code")?;
    let link = state
        .links
        .get(code)
        .await
        .map_err(|_| ApiError::NotFound("Short URL not found".into()))?;
    Ok(Json(Stats {
        short_code: link.id,
        long_url: link.long_url,
        clicks: link.clicks,
        created_at: link.created_at,
    }))
}
