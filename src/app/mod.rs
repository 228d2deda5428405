//! The unified demo application built on the substrate.
//!
//! Each resource module is a thin translation layer: validate the input
//! shape, call one or two [`Store`] operations, map domain conditions to
//! the error taxonomy, serialize the result. Everything stateful — the
//! stores, the token registry, the outbound HTTP client — lives in
//! [`AppState`], owned once and handed to handlers explicitly.

pub mod authn;
pub mod guestbook;
pub mod polls;
pub mod posts;
pub mod shortener;
pub mod todos;
pub mod weather;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::handler::Handler;
use crate::health;
use crate::method::Method;
use crate::middleware::auth::{require_auth, require_role};
use crate::middleware::cors::Cors;
use crate::middleware::trace::Trace;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::router::Router;
use crate::store::{JsonFileStore, MemoryStore, Store};
use crate::token::TokenRegistry;

/// A login credential with its role. The demo ships a fixed user set; a
/// real deployment would back this with its own collection.
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

fn seeded_users() -> Vec<User> {
    [
        ("1", "admin", "password", "admin"),
        ("2", "user1", "password1", "user"),
        ("3", "user2", "password2", "user"),
    ]
    .into_iter()
    .map(|(id, username, password, role)| User {
        id: id.into(),
        username: username.into(),
        password: password.into(),
        role: role.into(),
    })
    .collect()
}

/// Process-wide singletons, shared via `Arc` into every handler.
pub struct AppState {
    pub config: Config,
    pub users: Vec<User>,
    pub tokens: Arc<TokenRegistry>,
    pub todos: Arc<dyn Store<todos::Todo>>,
    pub entries: Arc<dyn Store<guestbook::Entry>>,
    pub polls: Arc<dyn Store<polls::Poll>>,
    pub posts: Arc<dyn Store<posts::Post>>,
    pub likes: Arc<dyn Store<posts::Like>>,
    pub links: Arc<dyn Store<shortener::ShortLink>>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Opens every collection under `config.data_dir` and assembles the
    /// shared state. Creates the directory when absent.
    pub async fn new(config: Config) -> Result<Arc<Self>, ApiError> {
        tokio::fs::create_dir_all(&config.data_dir).await?;
        let dir = &config.data_dir;

        let state = Self {
            users: seeded_users(),
            tokens: Arc::new(TokenRegistry::new(config.token_lifetime)),
            todos: Arc::new(MemoryStore::new()),
            entries: Arc::new(JsonFileStore::open(dir.join("guestbook.json")).await?),
            polls: Arc::new(JsonFileStore::open(dir.join("polls.json")).await?),
            posts: Arc::new(JsonFileStore::open(dir.join("posts.json")).await?),
            likes: Arc::new(JsonFileStore::open(dir.join("likes.json")).await?),
            links: Arc::new(MemoryStore::new()),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| ApiError::Internal(e.to_string()))?,
            config,
        };
        info!(data_dir = %state.config.data_dir.display(), "collections opened");
        Ok(Arc::new(state))
    }

    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }
}

/// Renames a store-level `NotFound` after the domain object, leaving the
/// other variants (notably `Internal` persistence failures) untouched.
pub(crate) fn named_not_found(err: ApiError, what: &str) -> ApiError {
    match err {
        ApiError::NotFound(_) => ApiError::NotFound(format!("{what} not found")),
        other => other,
    }
}

/// Adapts a `(state, request)` function into a [`Handler`]: explicit
/// dependency injection instead of globals.
fn with<F, Fut, R>(state: &Arc<AppState>, f: F) -> impl Handler
where
    F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let state = Arc::clone(state);
    move |req: Request| f(Arc::clone(&state), req)
}

/// Same, but behind the bearer-token guard.
fn authed<F, Fut, R>(state: &Arc<AppState>, f: F) -> impl Handler
where
    F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    require_auth(Arc::clone(&state.tokens), with(state, f))
}

/// Builds the full route table over `state`.
pub fn router(state: &Arc<AppState>) -> Router {
    use Method::{Delete, Get, Patch, Post, Put};

    Router::new()
        // todos — in-memory CRUD
        .on(Get,    "/api/todos",            with(state, todos::list))
        .on(Post,   "/api/todos",            with(state, todos::create))
        .on(Delete, "/api/todos/completed",  with(state, todos::delete_completed))
        .on(Patch,  "/api/todos/{id}",       with(state, todos::toggle))
        .on(Put,    "/api/todos/{id}",       with(state, todos::update))
        .on(Delete, "/api/todos/{id}",       with(state, todos::delete))
        // guestbook — file-backed, validated, paginated
        .on(Get,    "/api/entries",          with(state, guestbook::list))
        .on(Post,   "/api/entries",          with(state, guestbook::create))
        .on(Put,    "/api/entries/{id}",     with(state, guestbook::update))
        .on(Delete, "/api/entries/{id}",     with(state, guestbook::delete))
        // polls — file-backed, option-count validation
        .on(Get,    "/api/poll/latest",      with(state, polls::latest))
        .on(Post,   "/api/poll/create",      with(state, polls::create))
        .on(Post,   "/api/poll/vote/{poll_id}/{option}", with(state, polls::vote))
        // micro-blog — posts with likes, ownership checks
        .on(Get,    "/api/posts",            with(state, posts::list))
        .on(Post,   "/api/posts",            authed(state, posts::create))
        .on(Delete, "/api/posts/{id}",       authed(state, posts::delete))
        .on(Get,    "/api/users/{username}/posts", with(state, posts::by_user))
        .on(Post,   "/api/posts/{id}/like",  authed(state, posts::like))
        .on(Delete, "/api/posts/{id}/like",  authed(state, posts::unlike))
        .on(Get,    "/api/posts/{id}/likes-count", with(state, posts::likes_count))
        .on(Get,    "/api/posts/{id}/liked-by-me", authed(state, posts::liked_by_me))
        // auth demo
        .on(Post,   "/api/login",            with(state, authn::login))
        .on(Post,   "/api/logout",           with(state, authn::logout))
        .on(Get,    "/api/secret-data",      authed(state, authn::secret_data))
        .on(Get,    "/api/admin-data",
            require_role(Arc::clone(&state.tokens), "admin", with(state, authn::admin_data)))
        // URL shortener
        .on(Post,   "/api/shorten",          with(state, shortener::create))
        .on(Get,    "/api/stats/{code}",     with(state, shortener::stats))
        .on(Get,    "/{code}",               with(state, shortener::redirect))
        // weather proxy
        .on(Get,    "/api/weather/{city}",   with(state, weather::current))
        // probes
        .on(Get,    "/healthz",              health::liveness)
        .on(Get,    "/readyz",               health::readiness)
        // ambient layers — outermost first
        .wrap(Trace)
        .wrap(Cors::new(state.config.allowed_origins.clone()))
}
