//! # Storage Adapters
//!
//! Backends for the commitment index, chosen by [`StorageBackend`].

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbCommitmentStore, RocksDbConfig};

use hc_02_commitment_index::{CommitmentStore, InMemoryCommitmentStore, StoreError};
use tracing::info;

use crate::container::config::StorageBackend;

/// Open the store for `backend`.
pub fn open_store(backend: &StorageBackend) -> Result<Box<dyn CommitmentStore>, StoreError> {
    match backend {
        StorageBackend::Memory => {
            info!("Using in-memory commitment store");
            Ok(Box::new(InMemoryCommitmentStore::new()))
        }
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb { path } => {
            info!(path = %path.display(), "Opening RocksDB commitment store");
            Ok(Box::new(RocksDbCommitmentStore::open_default(path)?))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb { path } => Err(StoreError::Io {
            message: format!(
                "RocksDB store at {} requested but the `rocksdb` feature is disabled",
                path.display()
            ),
        }),
    }
}
