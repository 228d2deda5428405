//! Allow-list CORS.
//!
//! Cross-origin access is restricted to a fixed list of local development
//! origins. A matching `Origin` gets the `Access-Control-*` headers echoed
//! back; preflight `OPTIONS` requests are answered here and never reach
//! the router. Non-matching origins get the response unchanged — the
//! browser, not the server, is the enforcement point.

use async_trait::async_trait;

use super::{Middleware, Next};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// CORS middleware over a fixed origin allow-list.
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    fn allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

#[async_trait]
impl Middleware for Cors {
    async fn handle(&self, req: Request, next: Next<'_>) -> Response {
        let origin = match req.header("origin") {
            Some(o) if self.allowed(o) => Some(o.to_owned()),
            _ => None,
        };

        if req.method() == Method::Options {
            // Preflight: answer from here regardless of the route table.
            let mut response = Response::status(Status::NoContent);
            if let Some(origin) = &origin {
                decorate(&mut response, origin);
                response.append_header(
                    "access-control-allow-methods",
                    "GET, POST, PUT, PATCH, DELETE, OPTIONS",
                );
                response.append_header("access-control-allow-headers", "authorization, content-type");
            }
            return response;
        }

        let mut response = next.run(req).await;
        if let Some(origin) = &origin {
            decorate(&mut response, origin);
        }
        response
    }
}

fn decorate(response: &mut Response, origin: &str) {
    response.append_header("access-control-allow-origin", origin);
    response.append_header("access-control-allow-credentials", "true");
    response.append_header("vary", "origin");
}
