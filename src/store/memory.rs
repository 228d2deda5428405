//! In-memory backend: the collection is a mutex-guarded `Vec`.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::id;

use super::{MakeRecord, Patch, Record, Store};

/// A collection that lives and dies with the process.
pub struct MemoryStore<T> {
    records: Mutex<Vec<T>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self { records: Mutex::new(Vec::new()) }
    }

    /// Starts from a fixed set of records, for catalog-style resources
    /// that ship seeded.
    pub fn seeded(records: Vec<T>) -> Self {
        Self { records: Mutex::new(records) }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Store<T> for MemoryStore<T> {
    async fn create(&self, make: MakeRecord<T>) -> Result<T, ApiError> {
        let record = make(id::next());
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(ApiError::Conflict(format!("id `{}` already exists", record.id())));
        }
        records.push(record.clone());
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
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| ApiError::NotFound(format!("record `{id}` not found")))?;
        patch(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(ApiError::NotFound(format!("record `{id}` not found")));
        }
        Ok(())
    }
}
