//! Middleware layer.
//!
//! Middleware intercepts requests on the way in and responses on the way
//! out. It is the home of the cross-cutting concerns: per-request tracing,
//! allow-list CORS, and bearer-token authentication.
//!
//! Two shapes exist, on purpose:
//!
//! - [`Middleware`] implementations registered with
//!   [`Router::wrap`](crate::Router::wrap) run for **every** request,
//!   before routing. [`trace::Trace`] and [`cors::Cors`] live here.
//! - The auth guards ([`auth::require_auth`], [`auth::require_role`]) wrap
//!   **individual handlers**, because which routes are protected — and at
//!   what role — is a per-route decision, not a global one.

pub mod auth;
pub mod cors;
pub mod trace;

use std::sync::Arc;

use async_trait::async_trait;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// A global request interceptor.
///
/// Call `next.run(req)` to continue down the chain (eventually reaching
/// the router), or return a [`Response`] directly to short-circuit.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, req: Request, next: Next<'_>) -> Response;
}

/// The remainder of the chain: the layers not yet run, terminated by the
/// routing endpoint itself.
pub struct Next<'a> {
    pub(crate) layers: &'a [Arc<dyn Middleware>],
    pub(crate) endpoint: &'a (dyn Fn(Request) -> BoxFuture + Send + Sync),
}

impl Next<'_> {
    pub async fn run(self, req: Request) -> Response {
        match self.layers.split_first() {
            Some((layer, rest)) => {
                let next = Next { layers: rest, endpoint: self.endpoint };
                layer.handle(req, next).await
            }
            None => (self.endpoint)(req).await,
        }
    }
}
