//! Record fixtures and a store that always fails.

use shared_types::{CommitmentRecord, OutputKey};

use crate::domain::query::CommitmentQuery;
use crate::ports::outbound::{CommitmentStore, StoreError};

/// Expiry carried by [`make_record`] records.
pub const TEST_RETENTION: u64 = 1_700_003_600;

/// Record under txid `[n; 32]` at `output_index`, hash derived from `n`.
pub fn make_record(n: u8, output_index: u32, locator: &str) -> CommitmentRecord {
    let key = OutputKey::from_txid_bytes(&[n; 32], output_index);
    CommitmentRecord {
        txid: key.txid,
        output_index,
        content_locator: locator.to_string(),
        content_hash: hex_digest(n),
        retention_value: TEST_RETENTION,
        content_size: 1024,
        created_at: 1_700_000_000,
    }
}

fn hex_digest(n: u8) -> String {
    format!("{n:02x}").repeat(32)
}

/// Store whose every call fails with an I/O error.
#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Io {
            message: self.message.clone(),
        })
    }
}

impl CommitmentStore for FailingStore {
    fn insert(&self, _record: CommitmentRecord) -> Result<u64, StoreError> {
        self.fail()
    }

    fn delete(&self, _key: &OutputKey) -> Result<u64, StoreError> {
        self.fail()
    }

    fn get(&self, _key: &OutputKey) -> Result<Option<CommitmentRecord>, StoreError> {
        self.fail()
    }

    fn find(&self, _query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, StoreError> {
        self.fail()
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.fail()
    }
}
