//! # Inbound Ports (Driving Ports)
//!
//! API exposed by the commitment index.

use shared_types::{CommitmentEvent, CommitmentRecord, OutputKey};

use crate::domain::errors::IndexError;
use crate::domain::query::CommitmentQuery;
use crate::domain::stats::IndexStats;
use crate::service::Applied;

/// Commitment index API.
///
/// All list results are in insertion order; no match is an empty list.
pub trait CommitmentIndexApi: Send + Sync {
    /// Store a new record. Fails with `DuplicateKey` if the key is taken.
    fn insert(&self, record: CommitmentRecord) -> Result<(), IndexError>;

    /// Remove the record at `key` if present. Returns 0 or 1.
    fn delete(&self, key: &OutputKey) -> Result<u64, IndexError>;

    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, IndexError>;

    fn find_by_key(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, IndexError>;

    fn find_by_locator(&self, locator: &str) -> Result<Vec<CommitmentRecord>, IndexError> {
        self.find(&CommitmentQuery::by_locator(locator))
    }

    fn find_by_hash(&self, hash: &str) -> Result<Vec<CommitmentRecord>, IndexError> {
        self.find(&CommitmentQuery::by_hash(hash))
    }

    fn find_by_retention(&self, value: u64) -> Result<Vec<CommitmentRecord>, IndexError> {
        self.find(&CommitmentQuery::by_retention(value))
    }

    /// Apply one admission event. `DuplicateKey` is reported as
    /// [`Applied::Duplicate`], not as an error.
    fn apply(&self, event: CommitmentEvent) -> Result<Applied, IndexError>;

    fn stats(&self) -> Result<IndexStats, IndexError>;
}

impl<I: CommitmentIndexApi + ?Sized> CommitmentIndexApi for std::sync::Arc<I> {
    fn insert(&self, record: CommitmentRecord) -> Result<(), IndexError> {
        (**self).insert(record)
    }

    fn delete(&self, key: &OutputKey) -> Result<u64, IndexError> {
        (**self).delete(key)
    }

    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, IndexError> {
        (**self).find(query)
    }

    fn find_by_key(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, IndexError> {
        (**self).find_by_key(key)
    }

    fn apply(&self, event: CommitmentEvent) -> Result<Applied, IndexError> {
        (**self).apply(event)
    }

    fn stats(&self) -> Result<IndexStats, IndexError> {
        (**self).stats()
    }
}
