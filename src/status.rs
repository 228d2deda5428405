//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted — `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! The set is trimmed to what a JSON REST backend actually sends. Upstream
//! pass-through (proxying a third-party status verbatim) goes through the
//! raw-code path in [`ApiError::Upstream`](crate::ApiError::Upstream) and
//! does not need a variant here.

/// The status codes a resource-collection service emits.
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                    // 200
    Created,               // 201
    NoContent,             // 204

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    MovedPermanently,      // 301
    Found,                 // 302
    TemporaryRedirect,     // 307

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,            // 400
    Unauthorized,          // 401
    Forbidden,             // 403
    NotFound,              // 404
    MethodNotAllowed,      // 405
    Conflict,              // 409
    ContentTooLarge,       // 413
    UnprocessableContent,  // 422

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,   // 500
    BadGateway,            // 502
    ServiceUnavailable,    // 503
    GatewayTimeout,        // 504
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::Created              => 201,
            Status::NoContent            => 204,
            Status::MovedPermanently     => 301,
            Status::Found                => 302,
            Status::TemporaryRedirect    => 307,
            Status::BadRequest           => 400,
            Status::Unauthorized         => 401,
            Status::Forbidden            => 403,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::Conflict             => 409,
            Status::ContentTooLarge      => 413,
            Status::UnprocessableContent => 422,
            Status::InternalServerError  => 500,
            Status::BadGateway           => 502,
            Status::ServiceUnavailable   => 503,
            Status::GatewayTimeout       => 504,
        }
    }
}
