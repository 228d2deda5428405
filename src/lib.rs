//! # plinth
//!
//! A persistence-and-auth substrate for small JSON REST backends.
//!
//! Under every little CRUD service hides the same handful of parts. plinth
//! provides exactly those, once, and nothing else:
//!
//! - **Record Store** — keyed collections with create/read/update/delete,
//!   backed by memory or a flat JSON file, every mutation persisted before
//!   it is acknowledged ([`store`])
//! - **Token Registry** — opaque bearer tokens with read-time expiry
//!   ([`token`])
//! - **Access guards** — `Authorization: Bearer` resolution, 401/403
//!   short-circuit, the principal handed to the handler
//!   ([`middleware::auth`])
//! - **HTTP substrate** — radix-tree routing ([`matchit`]), hyper
//!   connection machinery, graceful shutdown, a middleware chain for
//!   tracing and allow-list CORS
//!
//! The [`app`] module wires all of it into a working service: todos,
//! guestbook, polls, a micro-blog with likes, login/logout with role-gated
//! reads, a URL shortener, and a weather proxy. The `plinthd` binary
//! serves it.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use plinth::{Method, Request, Response, Router, Server, Status};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .on(Method::Get,  "/api/todos/{id}", get_todo)
//!         .on(Method::Post, "/api/todos",      create_todo);
//!
//!     Server::bind("0.0.0.0:8000").serve(app).await.unwrap();
//! }
//!
//! async fn get_todo(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_todo(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(Status::BadRequest);
//!     }
//!     # let bytes: Vec<u8> = vec![];
//!     Response::builder()
//!         .status(Status::Created)
//!         .json(bytes)
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod app;
pub mod config;
pub mod health;
pub mod id;
pub mod middleware;
pub mod store;
pub mod token;

pub use error::{ApiError, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::{ContentType, Created, IntoResponse, Json, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
