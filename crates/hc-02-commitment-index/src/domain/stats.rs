//! Process-local index counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot returned by `CommitmentIndexApi::stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Records currently in the store.
    pub live_commitments: u64,
    /// Successful inserts by this process.
    pub inserts: u64,
    /// Inserts refused as `DuplicateKey`.
    pub duplicates: u64,
    /// Records removed by deletes.
    pub deletes: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    inserts: AtomicU64,
    duplicates: AtomicU64,
    deletes: AtomicU64,
}

impl Counters {
    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deletes(&self, count: u64) {
        self.deletes.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, live_commitments: u64) -> IndexStats {
        IndexStats {
            live_commitments,
            inserts: self.inserts.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }
}
