//! Per-request logging: method, path, status, latency.

use std::time::Instant;

use async_trait::async_trait;
use tracing::info;

use super::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Logs one structured line per request after the handler finishes.
pub struct Trace;

#[async_trait]
impl Middleware for Trace {
    async fn handle(&self, req: Request, next: Next<'_>) -> Response {
        let method = req.method();
        let path = req.path().to_owned();
        let start = Instant::now();

        let response = next.run(req).await;

        info!(
            %method,
            %path,
            status = response.status_code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request"
        );
        response
    }
}
