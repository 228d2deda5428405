//! Bearer-token access guards.
//!
//! A guard wraps a single handler. Per request it is a two-state machine:
//! the request arrives unauthenticated, and either every check passes —
//! the resolved [`Principal`] is attached and the inner handler runs — or
//! the first failing check terminates the request:
//!
//! - missing or malformed `Authorization: Bearer <token>` header → 401
//! - unknown or expired token → 401
//! - valid token, wrong role → 403
//!
//! Handlers behind a guard may call `req.principal()` with confidence;
//! it is always populated by the time they run.

use std::sync::Arc;

use crate::error::ApiError;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::token::{Principal, Session, TokenRegistry};

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(req: &Request) -> Result<&str, ApiError> {
    let header = req
        .header("authorization")
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".into()))?;
    header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authentication scheme".into()))
}

/// Requires any authenticated principal.
pub fn require_auth(registry: Arc<TokenRegistry>, handler: impl Handler) -> impl Handler {
    guard(registry, None, handler)
}

/// Requires an authenticated principal holding `role`. A valid token with
/// the wrong role is 403, never 401.
pub fn require_role(
    registry: Arc<TokenRegistry>,
    role: &'static str,
    handler: impl Handler,
) -> impl Handler {
    guard(registry, Some(role), handler)
}

fn guard(
    registry: Arc<TokenRegistry>,
    role: Option<&'static str>,
    handler: impl Handler,
) -> impl Handler {
    let inner = handler.into_boxed_handler();
    move |mut req: Request| {
        let registry = Arc::clone(&registry);
        let inner = Arc::clone(&inner);
        async move {
            let session = match authenticate(&registry, &req).await {
                Ok(s) => s,
                Err(e) => return e.into_response(),
            };
            if let Some(required) = role {
                if let Err(e) = session.require_role(required) {
                    return e.into_response();
                }
            }
            req.set_principal(Principal { name: session.principal, role: session.role });
            inner.call(req).await
        }
    }
}

async fn authenticate(registry: &TokenRegistry, req: &Request) -> Result<Session, ApiError> {
    let token = bearer_token(req)?;
    registry.resolve(token).await
}
