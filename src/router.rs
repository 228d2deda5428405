//! Radix-tree request router with a middleware chain.
//!
//! One tree per HTTP method, O(path-length) lookup. Global middleware
//! registered with [`Router::wrap`] runs before routing; per-route
//! protection is a handler wrapper (see
//! [`middleware::auth`](crate::middleware::auth)).

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::ApiError;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The application router.
///
/// Build it once at startup; pass it to
/// [`Server::serve`](crate::Server::serve). Each registration call
/// returns `self` so the route table reads as one chained expression.
///
/// ```rust,no_run
/// # use plinth::{Method, Request, Response, Router};
/// # async fn list_todos(_: Request) -> Response { Response::text("") }
/// # async fn create_todo(_: Request) -> Response { Response::text("") }
/// # async fn delete_todo(_: Request) -> Response { Response::text("") }
/// Router::new()
///     .on(Method::Get,    "/api/todos",      list_todos)
///     .on(Method::Post,   "/api/todos",      create_todo)
///     .on(Method::Delete, "/api/todos/{id}", delete_todo);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Registers a handler for a method + path pair. Path parameters use
    /// `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting path pattern. Routes are
    /// registered once at startup, so this fails loudly at boot rather
    /// than surfacing per-request.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Appends a global middleware layer. Layers run in registration
    /// order, outermost first.
    pub fn wrap(mut self, layer: impl Middleware) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Runs one request through the middleware chain and the route table.
    ///
    /// This is the seam tests drive directly: build a [`Request`] with
    /// [`Request::builder`], dispatch it, assert on the [`Response`] —
    /// no socket involved.
    pub async fn dispatch(&self, req: Request) -> Response {
        let endpoint = |req: Request| self.route(req);
        Next { layers: &self.layers, endpoint: &endpoint }.run(req).await
    }

    fn route(&self, mut req: Request) -> BoxFuture {
        let method = req.method();
        let path = req.path().to_owned();

        if let Some(tree) = self.routes.get(&method) {
            if let Ok(matched) = tree.at(&path) {
                let handler = Arc::clone(matched.value);
                req.params = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return handler.call(req);
            }
        }

        // The path may exist under a different method: that is a 405,
        // not a 404.
        let other_method = self
            .routes
            .iter()
            .any(|(m, tree)| *m != method && tree.at(&path).is_ok());
        Box::pin(async move {
            if other_method {
                Response::with_status_code(405)
                    .json(br#"{"detail":"Method Not Allowed"}"#.to_vec())
            } else {
                ApiError::NotFound("Not Found".into()).into_response()
            }
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
