//! # Commitment Index Subsystem (hc-02)
//!
//! Keeps the set of ledger outputs that currently hold a live hosting
//! commitment, keyed by `(ledgerTxId, outputIndex)`.
//!
//! ## Lifecycle
//!
//! ```text
//! CommitmentEvent::Admitted ──insert──→ [record] ──delete──← CommitmentEvent::Spent
//!                                          │
//!                         find by locator / hash / retention / key
//! ```
//!
//! Records are never updated. A second insert under the same key fails with
//! `DuplicateKey`, which admission treats as a replay. A delete of an absent
//! key returns 0.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): query predicate, errors, counters
//! - **Ports Layer** (`ports/`): `CommitmentIndexApi` (inbound), `CommitmentStore` (outbound)
//! - **Service Layer** (`service.rs`): `CommitmentIndex`
//! - **Adapters** (`adapters/`): in-memory store, lookup service
//!
//! ## Consistency
//!
//! Key uniqueness is enforced by the store, not by the service. Concurrent
//! inserts racing on one key leave exactly one record; every loser gets
//! `DuplicateKey`.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Record fixtures and a failing store.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use adapters::lookup::{
    LookupAnswer, LookupError, LookupQuestion, LookupService, OutputReference, ServiceMetadata,
    DEFAULT_LOOKUP_SERVICE, NO_MATCH_MESSAGE,
};
pub use adapters::memory::InMemoryCommitmentStore;
pub use domain::errors::IndexError;
pub use domain::query::CommitmentQuery;
pub use domain::stats::IndexStats;
pub use ports::inbound::CommitmentIndexApi;
pub use ports::outbound::{CommitmentStore, StoreError};
pub use service::{Applied, CommitmentIndex};
