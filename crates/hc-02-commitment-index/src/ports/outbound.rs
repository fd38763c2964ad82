//! # Outbound Ports (Driven Ports)
//!
//! The contract the index needs from a document store: insert, delete, find.
//!
//! Production: `RocksDbCommitmentStore` (node-runtime, feature `rocksdb`)
//! Testing: `InMemoryCommitmentStore`

use shared_types::{CommitmentRecord, OutputKey};
use thiserror::Error;

use crate::domain::query::CommitmentQuery;

/// Abstract interface for commitment storage.
///
/// ## Uniqueness
///
/// `insert` must be atomic with respect to the key: of any number of
/// concurrent inserts under one key, including inserts from other processes
/// sharing the store, exactly one succeeds and the rest fail with
/// `UniqueViolation`.
///
/// ## Ordering
///
/// `find` returns records in insertion order, tracked by a per-store
/// sequence number that is persisted with each record.
pub trait CommitmentStore: Send + Sync {
    /// Insert a record. Returns its sequence number.
    fn insert(&self, record: CommitmentRecord) -> Result<u64, StoreError>;

    /// Remove the record at `key`. Returns the number removed, 0 or 1.
    fn delete(&self, key: &OutputKey) -> Result<u64, StoreError>;

    fn get(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, StoreError>;

    /// All records matching `query`, oldest first.
    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, StoreError>;

    /// Number of records held.
    fn count(&self) -> Result<u64, StoreError>;
}

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Unique constraint violated for {key}")]
    UniqueViolation { key: OutputKey },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl<S: CommitmentStore + ?Sized> CommitmentStore for std::sync::Arc<S> {
    fn insert(&self, record: CommitmentRecord) -> Result<u64, StoreError> {
        (**self).insert(record)
    }

    fn delete(&self, key: &OutputKey) -> Result<u64, StoreError> {
        (**self).delete(key)
    }

    fn get(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, StoreError> {
        (**self).get(key)
    }

    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, StoreError> {
        (**self).find(query)
    }

    fn count(&self) -> Result<u64, StoreError> {
        (**self).count()
    }
}

impl<S: CommitmentStore + ?Sized> CommitmentStore for Box<S> {
    fn insert(&self, record: CommitmentRecord) -> Result<u64, StoreError> {
        (**self).insert(record)
    }

    fn delete(&self, key: &OutputKey) -> Result<u64, StoreError> {
        (**self).delete(key)
    }

    fn get(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, StoreError> {
        (**self).get(key)
    }

    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, StoreError> {
        (**self).find(query)
    }

    fn count(&self) -> Result<u64, StoreError> {
        (**self).count()
    }
}
