//! Error types: infrastructure failures and the API error taxonomy.
//!
//! Two distinct error surfaces live here:
//!
//! - [`Error`] wraps I/O failures of the server itself (binding a port,
//!   accepting a connection). These never reach an HTTP client.
//! - [`ApiError`] is the request-level taxonomy. Every handler returns
//!   `Result<_, ApiError>`; at the handler boundary each variant maps to
//!   exactly one HTTP status plus a `{"detail": "<message>"}` JSON body.
//!   Nothing is retried automatically.

use std::fmt;

use crate::response::{IntoResponse, Response};

/// Infrastructure error: binding to a port or accepting a connection.
///
/// Application-level failures (404, 409, …) are expressed as [`ApiError`]
/// values, not as `Error`s.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

/// The request-level error taxonomy.
///
/// | Variant        | Status | Meaning                                         |
/// |----------------|--------|-------------------------------------------------|
/// | `BadRequest`   | 400    | malformed or invalid input, surfaced verbatim   |
/// | `Unauthorized` | 401    | missing, invalid, or expired credential         |
/// | `Forbidden`    | 403    | valid credential, insufficient privilege        |
/// | `NotFound`     | 404    | identifier absent                               |
/// | `Conflict`     | 409    | duplicate unique constraint                     |
/// | `Upstream`     | as-is  | third-party dependency failed; status/message   |
/// |                |        | propagated unchanged                            |
/// | `Internal`     | 500    | persistence or other infrastructure failure     |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status code this error maps to at the handler boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_)          => 400,
            Self::Unauthorized(_)        => 401,
            Self::Forbidden(_)           => 403,
            Self::NotFound(_)            => 404,
            Self::Conflict(_)            => 409,
            Self::Upstream { status, .. } => *status,
            Self::Internal(_)            => 500,
        }
    }
}

/// Persistence I/O failures are internal: fatal to the request, not retried.
impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Serialization failures while persisting are internal too. Body *parse*
/// failures are mapped to `BadRequest` explicitly at the extraction site
/// ([`Request::json`](crate::Request::json)), never through this impl.
impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        let body = serde_json::json!({ "detail": detail });
        Response::with_status_code(self.status_code())
            .json(serde_json::to_vec(&body).unwrap_or_else(|_| b"{}".to_vec()))
    }
}
