//! # In-Memory Commitment Store
//!
//! Records ordered by sequence number, plus a key → sequence map. Both live
//! under one `RwLock`, so the uniqueness check and the write are a single
//! critical section.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use shared_types::{CommitmentRecord, OutputKey};

use crate::domain::query::CommitmentQuery;
use crate::ports::outbound::{CommitmentStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    next_sequence: u64,
    by_sequence: BTreeMap<u64, CommitmentRecord>,
    sequence_of: HashMap<OutputKey, u64>,
}

/// In-memory [`CommitmentStore`].
#[derive(Debug, Default)]
pub struct InMemoryCommitmentStore {
    state: RwLock<MemoryState>,
}

impl InMemoryCommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommitmentStore for InMemoryCommitmentStore {
    fn insert(&self, record: CommitmentRecord) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        let key = record.key();
        if state.sequence_of.contains_key(&key) {
            return Err(StoreError::UniqueViolation { key });
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.sequence_of.insert(key, sequence);
        state.by_sequence.insert(sequence, record);
        Ok(sequence)
    }

    fn delete(&self, key: &OutputKey) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        match state.sequence_of.remove(key) {
            Some(sequence) => {
                state.by_sequence.remove(&sequence);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn get(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, StoreError> {
        let state = self.state.read();
        Ok(state
            .sequence_of
            .get(key)
            .and_then(|sequence| state.by_sequence.get(sequence))
            .cloned())
    }

    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, StoreError> {
        let state = self.state.read();
        Ok(state
            .by_sequence
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().sequence_of.len() as u64)
    }
}
