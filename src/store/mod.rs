//! Record Store: generic keyed collections with pluggable persistence.
//!
//! A [`Store`] owns one collection of one record kind. Two backends ship:
//!
//! - [`MemoryStore`] — the collection lives and dies with the process.
//! - [`JsonFileStore`] — the collection is one pretty-printed JSON array
//!   on disk, rewritten wholesale on every mutation.
//!
//! Both guarantee the same contract: a mutation is acknowledged only after
//! persistence has completed, every mutation is immediately visible to
//! subsequent reads in the same process, and mutating access to one
//! collection is serialized (the file backend holds its lock across the
//! persistence await, so two requests can never interleave a
//! read-modify-write on the same file).
//!
//! Handlers hold stores as `Arc<dyn Store<T>>`, which is what makes the
//! backends interchangeable per resource.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;

/// One stored item within a collection.
///
/// Records are plain serde data carrying their own unique string id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Builds a record from the identifier the store assigns it.
pub type MakeRecord<T> = Box<dyn FnOnce(String) -> T + Send>;

/// Mutates a record in place during [`Store::update`].
pub type Patch<T> = Box<dyn FnOnce(&mut T) + Send>;

/// CRUD over one collection. Object-safe so handlers can hold
/// `Arc<dyn Store<T>>` and stay backend-agnostic.
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    /// Assigns a fresh identifier, builds the record, appends it,
    /// persists, and returns the stored value. `Conflict` if the built
    /// record's id is already present (only possible when the builder
    /// ignores the assigned id in favor of a caller-chosen one).
    async fn create(&self, make: MakeRecord<T>) -> Result<T, ApiError>;

    /// A snapshot of the whole collection. Filtering, sorting, and
    /// pagination are the caller's business.
    async fn list(&self) -> Result<Vec<T>, ApiError>;

    /// `NotFound` if absent.
    async fn get(&self, id: &str) -> Result<T, ApiError>;

    /// Applies `patch` to the record, persists, and returns the new
    /// value. `NotFound` if absent.
    async fn update(&self, id: &str, patch: Patch<T>) -> Result<T, ApiError>;

    /// `NotFound` if absent — including the second of two deletes.
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}
