//! # Integration Tests
//!
//! Admission wired to the commitment index through [`DirectIndexSink`], so
//! every scenario observes the index synchronously.
//!
//! [`DirectIndexSink`]: node_runtime::DirectIndexSink

pub mod scenarios;
