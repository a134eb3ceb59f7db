#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Persistence adapter contract for reconciled insolation records.
//!
//! The pipeline does not own a storage engine; it requires a
//! collaborator that satisfies [`InsolationStore`]: an at-least-once
//! upsert with conflict-replace semantics on the natural key
//! `(city, province, date, hour)`, plus the two read-only queries the
//! stats surface uses. [`MemoryStore`] is the in-process
//! implementation used by tests and local dry runs; the hosted
//! relational backend implements the same trait out of tree.

use std::collections::HashMap;

use chrono::NaiveDate;
use sun_map_models::{InsolationRecord, RecordKey};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend rejected or failed the operation.
    #[error("Storage backend error: {message}")]
    Backend {
        /// Description of what went wrong.
        message: String,
    },
}

/// Contract the pipeline requires of its storage collaborator.
///
/// Calling [`upsert`](Self::upsert) twice with identical records must
/// never create duplicates or error, and must leave storage reflecting
/// the most recently upserted value per key.
#[async_trait::async_trait]
pub trait InsolationStore: Send + Sync {
    /// Upserts the given records, replacing any existing record with
    /// the same natural key. Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the write.
    async fn upsert(&self, records: &[InsolationRecord]) -> Result<u64, StorageError>;

    /// Returns the total number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the query.
    async fn record_count(&self) -> Result<u64, StorageError>;

    /// Returns the most recent forecast date present in storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the query.
    async fn latest_date(&self) -> Result<Option<NaiveDate>, StorageError>;
}

/// In-memory [`InsolationStore`] keyed by the natural key.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKey, InsolationRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all stored records, unordered.
    pub async fn all(&self) -> Vec<InsolationRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl InsolationStore for MemoryStore {
    async fn upsert(&self, records: &[InsolationRecord]) -> Result<u64, StorageError> {
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.natural_key(), record.clone());
        }
        log::debug!("upserted {} records ({} total)", records.len(), map.len());
        Ok(records.len() as u64)
    }

    async fn record_count(&self) -> Result<u64, StorageError> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn latest_date(&self) -> Result<Option<NaiveDate>, StorageError> {
        Ok(self.records.read().await.values().map(|r| r.date).max())
    }
}
