//! Micro-blog: posts plus likes, the one place two collections interact.
//!
//! The composition is a direct two-step call — check the post, then touch
//! the likes collection — with no transactional guarantee beyond each
//! store operation's own atomicity. The uniqueness invariant is one like
//! per (user, post) pair, enforced by lookup-then-create under tutorial
//! load.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;
use crate::response::{Created, Json};
use crate::status::Status;
use crate::store::Record;
use crate::token::Principal;

use super::{named_not_found, AppState, User};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub owner_id: String,
    pub owner_username: String,
}

impl Record for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A like references its parent post by identifier; no other referential
/// integrity is enforced.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
}

impl Record for Like {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
struct PostCreate {
    text: String,
}

#[derive(Serialize)]
pub struct LikesCount {
    count: usize,
}

#[derive(Serialize)]
pub struct LikedByMe {
    liked: bool,
}

/// The seeded user behind the authenticated principal. Guarded routes
/// always carry a principal; a missing one is a wiring bug, not a client
/// error.
fn current_user<'a>(state: &'a AppState, req: &Request) -> Result<&'a User, ApiError> {
    let principal: &Principal = req
        .principal()
        .ok_or_else(|| ApiError::Internal("route is missing its auth guard".into()))?;
    state
        .find_user(&principal.name)
        .ok_or_else(|| ApiError::Unauthorized("Unknown principal".into()))
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    posts
}

/// GET /api/posts — newest first.
pub async fn list(state: Arc<AppState>, _req: Request) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(newest_first(state.posts.list().await?)))
}

/// POST /api/posts → 201 (authenticated).
pub async fn create(state: Arc<AppState>, req: Request) -> Result<Created<Post>, ApiError> {
    let user = current_user(&state, &req)?.clone();
    let payload: PostCreate = req.json()?;
    let text = payload.text.trim().to_owned();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Post text must not be empty".into()));
    }
    let post = state
        .posts
        .create(Box::new(move |id| Post {
            id,
            text,
            timestamp: Utc::now(),
            owner_id: user.id,
            owner_username: user.username,
        }))
        .await?;
    Ok(Created(post))
}

/// DELETE /api/posts/{id} → 204. Only the owner may delete; anyone
/// else with a valid token gets 403, not 404.
pub async fn delete(state: Arc<AppState>, req: Request) -> Result<Status, ApiError> {
    let user = current_user(&state, &req)?.clone();
    let id = req.require_param("id")?;
    let post = state
        .posts
        .get(id)
        .await
        .map_err(|e| named_not_found(e, "Post"))?;
    if post.owner_id != user.id {
        return Err(ApiError::Forbidden("Not authorized to delete this post".into()));
    }
    state.posts.delete(id).await?;
    Ok(Status::NoContent)
}

/// GET /api/users/{username}/posts — one author's posts, newest first.
pub async fn by_user(state: Arc<AppState>, req: Request) -> Result<Json<Vec<Post>>, ApiError> {
    let username = req.require_param("username")?;
    let posts = state
        .posts
        .list()
        .await?
        .into_iter()
        .filter(|p| p.owner_username == username)
        .collect();
    Ok(Json(newest_first(posts)))
}

async fn find_like(state: &AppState, user_id: &str, post_id: &str) -> Result<Option<Like>, ApiError> {
    Ok(state
        .likes
        .list()
        .await?
        .into_iter()
        .find(|l| l.user_id == user_id && l.post_id == post_id))
}

/// POST /api/posts/{id}/like → 204. The second like from the same user
/// is a 409.
pub async fn like(state: Arc<AppState>, req: Request) -> Result<Status, ApiError> {
    let user = current_user(&state, &req)?.clone();
    let post_id = req.require_param("id")?.to_owned();

    state
        .posts
        .get(&post_id)
        .await
        .map_err(|e| named_not_found(e, "Post"))?;
    if find_like(&state, &user.id, &post_id).await?.is_some() {
        return Err(ApiError::Conflict("Already liked".into()));
    }
    state
        .likes
        .create(Box::new(move |id| Like { id, user_id: user.id, post_id }))
        .await?;
    Ok(Status::NoContent)
}

/// DELETE /api/posts/{id}/like → 204. Removes exactly one like.
pub async fn unlike(state: Arc<AppState>, req: Request) -> Result<Status, ApiError> {
    let user = current_user(&state, &req)?.clone();
    let post_id = req.require_param("id")?;

    let like = find_like(&state, &user.id, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Like not found".into()))?;
    state.likes.delete(&like.id).await?;
    Ok(Status::NoContent)
}

/// GET /api/posts/{id}/likes-count
pub async fn likes_count(state: Arc<AppState>, req: Request) -> Result<Json<LikesCount>, ApiError> {
    let post_id = req.require_param("id")?;
    let count = state
        .likes
        .list()
        .await?
        .iter()
        .filter(|l| l.post_id == post_id)
        .count();
    Ok(Json(LikesCount { count }))
}

/// GET /api/posts/{id}/liked-by-me (authenticated)
pub async fn liked_by_me(state: Arc<AppState>, req: Request) -> Result<Json<LikedByMe>, ApiError> {
    let user = current_user(&state, &req)?.clone();
    let post_id = req.require_param("id")?;
    let liked = find_like(&state, &user.id, post_id).await?.is_some();
    Ok(Json(LikedByMe { liked }))
}
