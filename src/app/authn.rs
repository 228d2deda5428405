//! Login, logout, and the two protected demo reads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::auth::bearer_token;
use crate::request::Request;
use crate::response::Json;
use crate::token::Principal;

use super::AppState;

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    access_token: String,
    token_type: &'static str,
    role: String,
    user: UserView,
}

#[derive(Serialize)]
pub struct UserView {
    id: String,
    username: String,
}

#[derive(Serialize)]
pub struct Message {
    message: String,
    role: String,
}

/// POST /api/login — verifies credentials and issues a fresh bearer
/// token. Issuing never invalidates earlier tokens for the same user.
pub async fn login(state: Arc<AppState>, req: Request) -> Result<Json<LoginResponse>, ApiError> {
    let creds: Credentials = req.json()?;
    let user = state
        .find_user(&creds.username)
        .filter(|u| u.password == creds.password)
        .ok_or_else(|| ApiError::Unauthorized("Incorrect username or password".into()))?;

    let token = state.tokens.issue(&user.username, &user.role).await;
    Ok(Json(LoginResponse {
        access_token: token.token,
        token_type: "bearer",
        role: token.role,
        user: UserView { id: user.id.clone(), username: user.username.clone() },
    }))
}

/// POST /api/logout — revokes the presented token. A malformed header is
/// a 401; revoking an already-dead token still reports success.
pub async fn logout(state: Arc<AppState>, req: Request) -> Result<Json<serde_json::Value>, ApiError> {
    let token = bearer_token(&req)?;
    state.tokens.revoke(token).await;
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

fn principal_of(req: &Request) -> Result<&Principal, ApiError> {
    req.principal()
        .ok_or_else(|| ApiError::Internal("route is missing its auth guard".into()))
}

/// GET /api/secret-data — any authenticated principal.
pub async fn secret_data(_state: Arc<AppState>, req: Request) -> Result<Json<Message>, ApiError> {
    let principal = principal_of(&req)?;
    Ok(Json(Message {
        message: format!("Hello, {}! The secret is 42.", principal.name),
        role: principal.role.clone(),
    }))
}

/// GET /api/admin-data — admin role only; the role gate lives in the
/// route table, not here.
pub async fn admin_data(_state: Arc<AppState>, req: Request) -> Result<Json<Message>, ApiError> {
    let principal = principal_of(&req)?;
    Ok(Json(Message {
        message: format!("Hello, {}! This is admin-only data.", principal.name),
        role: principal.role.clone(),
    }))
}
