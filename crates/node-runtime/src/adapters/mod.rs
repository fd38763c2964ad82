//! # Adapters
//!
//! Runtime-side implementations of subsystem ports.

pub mod index_sink;
pub mod storage;

pub use index_sink::DirectIndexSink;
pub use storage::open_store;
