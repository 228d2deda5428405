//! Flat-file backend: one pretty-printed JSON array per collection.
//!
//! Wholesale rewrite on every mutation is a deliberate simplification for
//! low-volume collections, not a pattern to emulate under load. What is
//! *not* negotiable is the failure behavior: the new array is written to a
//! sibling temp file and renamed over the old one, and the in-memory copy
//! is swapped only after the rename succeeds. A failed write therefore
//! surfaces as a 500 and leaves both the file and the in-memory collection
//! exactly as they were.
//!
//! The mutex is held across the persistence await. That is the point: it
//! serializes the whole read-modify-write, which is what stops two
//! concurrent mutations from losing each other's writes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ApiError;
use crate::id;

use super::{MakeRecord, Patch, Record, Store};

/// A collection persisted as a single UTF-8 JSON array file.
pub struct JsonFileStore<T> {
    path: PathBuf,
    records: Mutex<Vec<T>>,
}

impl<T: Record> JsonFileStore<T> {
    /// Loads the collection from `path`, or starts empty when the file is
    /// absent or blank. A file that exists but does not parse is an error:
    /// silently discarding someone's data is worse than refusing to start.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(raw) if raw.iter().all(|b| b.is_ascii_whitespace()) => Vec::new(),
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                ApiError::Internal(format!("corrupt collection file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), records = records.len(), "collection loaded");
        Ok(Self { path, records: Mutex::new(records) })
    }

    /// Serializes `records` and renames it over the collection file.
    async fn persist(path: &Path, records: &[T]) -> Result<(), ApiError> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: Record> Store<T> for JsonFileStore<T> {
    async fn create(&self, make: MakeRecord<T>) -> Result<T, ApiError> {
        let record = make(id::next());
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(ApiError::Conflict(format!("id `{}` already exists", record.id())));
        }
        let mut next = records.clone();
        next.push(record.clone());
        Self::persist(&self.path, &next).await?;
        *records = next;
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<T>, ApiError> {
        Ok(self.records.lock().await.clone())
    }

    async fn get(&self, id: &str) -> Result<T, ApiError> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("record `{id}` not found")))
    }

    async fn update(&self, id: &str, patch: Patch<T>) -> Result<T, ApiError> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        let record = next
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| ApiError::NotFound(format!("record `{id}` not found")))?;
        patch(record);
        let updated = record.clone();
        Self::persist(&self.path, &next).await?;
        *records = next;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let mut records = self.records.lock().await;
        let next: Vec<T> = records.iter().filter(|r| r.id() != id).cloned().collect();
        if next.len() == records.len() {
            return Err(ApiError::NotFound(format!("record `{id}` not found")));
        }
        Self::persist(&self.path, &next).await?;
        *records = next;
        Ok(())
    }
}
