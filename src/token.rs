//! Bearer-token session registry.
//!
//! Maps an opaque token to a principal, role, and issue time. Expiry is
//! lazy: an entry outlives its lifetime until someone tries to resolve it,
//! at which point it is evicted and the caller gets `Unauthorized`. There
//! is no single-session-per-user rule — issuing a new token leaves older
//! tokens for the same principal valid until their own expiry.
//!
//! Role enforcement is deliberately *not* part of [`resolve`]: resolving
//! answers "who is this", [`Session::require_role`] separately answers
//! "may they". The distinction is what keeps 401 and 403 from blurring.
//!
//! [`resolve`]: TokenRegistry::resolve

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::id;

/// The authenticated identity attached to a request.
#[derive(Clone, Debug)]
pub struct Principal {
    pub name: String,
    pub role: String,
}

/// One live registry entry.
#[derive(Clone, Debug)]
pub struct Session {
    pub principal: String,
    pub role: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Layered on top of `resolve`: `Forbidden` when the resolved role
    /// does not match.
    pub fn require_role(&self, role: &str) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Insufficient permissions".into()))
        }
    }
}

/// A freshly issued credential, as returned to the login handler.
#[derive(Clone, Debug)]
pub struct Token {
    pub token: String,
    pub principal: String,
    pub role: String,
    pub issued_at: DateTime<Utc>,
}

/// Process-wide registry of bearer tokens. One instance per service,
/// shared via `Arc`; the mutex serializes all mutation.
pub struct TokenRegistry {
    lifetime: TimeDelta,
    sessions: Mutex<HashMap<String, Session>>,
}

impl TokenRegistry {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime: TimeDelta::from_std(lifetime).unwrap_or(TimeDelta::MAX),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a new token for `principal`. Always succeeds; never
    /// invalidates anything already issued.
    pub async fn issue(&self, principal: &str, role: &str) -> Token {
        let token = Token {
            token: id::next(),
            principal: principal.to_owned(),
            role: role.to_owned(),
            issued_at: Utc::now(),
        };
        let session = Session {
            principal: token.principal.clone(),
            role: token.role.clone(),
            issued_at: token.issued_at,
        };
        self.sessions.lock().await.insert(token.token.clone(), session);
        token
    }

    /// Resolves a token to its session. Unknown tokens and expired tokens
    /// both come back `Unauthorized`; expired entries are evicted here,
    /// on read, rather than by any background sweep.
    pub async fn resolve(&self, token: &str) -> Result<Session, ApiError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get(token)
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".into()))?;
        if Utc::now() - session.issued_at > self.lifetime {
            sessions.remove(token);
            return Err(ApiError::Unauthorized("Token expired".into()));
        }
        Ok(session.clone())
    }

    /// Removes a token unconditionally. Revoking an absent token is not
    /// an error.
    pub async fn revoke(&self, token: &str) {
        self.sessions.lock().await.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_what_it_issued() {
        let registry = TokenRegistry::new(Duration::from_secs(3600));
        let token = registry.issue("user1", "user").await;
        let session = registry.resolve(&token.token).await.unwrap();
        assert_eq!(session.principal, "user1");
        assert_eq!(session.role, "user");
        assert_eq!(session.issued_at, token.issued_at);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let registry = TokenRegistry::new(Duration::from_secs(3600));
        let err = registry.resolve("nope").await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn expired_token_is_evicted_on_read() {
        let registry = TokenRegistry::new(Duration::ZERO);
        let token = registry.issue("user1", "user").await;
        // Lifetime zero: expired by the time it is read.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let err = registry.resolve(&token.token).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert!(registry.sessions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_final() {
        let registry = TokenRegistry::new(Duration::from_secs(3600));
        let token = registry.issue("user1", "user").await;
        registry.revoke(&token.token).await;
        registry.revoke(&token.token).await;
        assert!(registry.resolve(&token.token).await.is_err());
    }

    #[tokio::test]
    async fn old_tokens_survive_reissue() {
        let registry = TokenRegistry::new(Duration::from_secs(3600));
        let first = registry.issue("user1", "user").await;
        let second = registry.issue("user1", "user").await;
        assert_ne!(first.token, second.token);
        assert!(registry.resolve(&first.token).await.is_ok());
        assert!(registry.resolve(&second.token).await.is_ok());
    }

    #[tokio::test]
    async fn role_check_is_forbidden_not_unauthorized() {
        let registry = TokenRegistry::new(Duration::from_secs(3600));
        let token = registry.issue("user1", "user").await;
        let session = registry.resolve(&token.token).await.unwrap();
        let err = session.require_role("admin").unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(session.require_role("user").is_ok());
    }
}
