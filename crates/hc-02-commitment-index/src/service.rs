//! # Commitment Index Service
//!
//! Implements `CommitmentIndexApi` over an injected `CommitmentStore`.
//! The service keeps counters and logs; the store keeps the records and
//! enforces key uniqueness.

use shared_types::{CommitmentEvent, CommitmentRecord, OutputKey};
use tracing::{debug, error};

use crate::domain::errors::IndexError;
use crate::domain::query::CommitmentQuery;
use crate::domain::stats::{Counters, IndexStats};
use crate::ports::inbound::CommitmentIndexApi;
use crate::ports::outbound::CommitmentStore;

pub use shared_types::Applied;

/// The commitment index.
pub struct CommitmentIndex<S: CommitmentStore> {
    store: S,
    counters: Counters,
}

impl<S: CommitmentStore> CommitmentIndex<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            counters: Counters::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn storage_failure(
        operation: &'static str,
        key: Option<&OutputKey>,
        err: IndexError,
    ) -> IndexError {
        match key {
            Some(key) => error!(operation, output = %key, error = %err, "Commitment store failed"),
            None => error!(operation, error = %err, "Commitment store failed"),
        }
        err
    }
}

impl<S: CommitmentStore> CommitmentIndexApi for CommitmentIndex<S> {
    fn insert(&self, record: CommitmentRecord) -> Result<(), IndexError> {
        let key = record.key();
        match self.store.insert(record).map_err(IndexError::from) {
            Ok(sequence) => {
                self.counters.record_insert();
                debug!(output = %key, sequence, "Commitment indexed");
                Ok(())
            }
            Err(err @ IndexError::DuplicateKey { .. }) => {
                self.counters.record_duplicate();
                debug!(output = %key, "Commitment key already indexed");
                Err(err)
            }
            Err(err) => Err(Self::storage_failure("insert", Some(&key), err)),
        }
    }

    fn delete(&self, key: &OutputKey) -> Result<u64, IndexError> {
        match self.store.delete(key) {
            Ok(count) => {
                self.counters.record_deletes(count);
                if count == 0 {
                    debug!(output = %key, "No commitment to delete");
                }
                Ok(count)
            }
            Err(err) => Err(Self::storage_failure("delete", Some(key), err.into())),
        }
    }

    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, IndexError> {
        self.store
            .find(query)
            .map_err(|err| Self::storage_failure("find", None, err.into()))
    }

    fn find_by_key(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, IndexError> {
        self.store
            .get(key)
            .map_err(|err| Self::storage_failure("get", Some(key), err.into()))
    }

    fn apply(&self, event: CommitmentEvent) -> Result<Applied, IndexError> {
        match event {
            CommitmentEvent::Admitted(record) => match self.insert(record) {
                Ok(()) => Ok(Applied::Inserted),
                Err(IndexError::DuplicateKey { .. }) => Ok(Applied::Duplicate),
                Err(err) => Err(err),
            },
            CommitmentEvent::Spent(key) => {
                self.delete(&key).map(|count| Applied::Removed { count })
            }
        }
    }

    fn stats(&self) -> Result<IndexStats, IndexError> {
        let live = self
            .store
            .count()
            .map_err(|err| Self::storage_failure("count", None, err.into()))?;
        Ok(self.counters.snapshot(live))
    }
}
