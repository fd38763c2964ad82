//! # Node Runtime Library
//!
//! Hosts the hosting-commitment subsystems in one process. The main entry
//! point is the `main.rs` binary; the modules are exposed for tests.
//!
//! ```text
//! LedgerEvent ──→ hc-01 Admission ──→ event channel ──→ IndexEventHandler ──→ hc-02 Index
//!                                                                                  │
//!                                               LookupQuestion ──→ LookupService ──┘
//! ```
//!
//! ## Features
//!
//! - `rocksdb` - persistent commitment store (default is in-memory)

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use adapters::DirectIndexSink;
pub use container::{ConfigError, ContainerError, NodeConfig, StorageBackend, SubsystemContainer};
pub use handlers::{HandlerStatsSnapshot, IndexEventHandler};
pub use runtime::NodeRuntime;
