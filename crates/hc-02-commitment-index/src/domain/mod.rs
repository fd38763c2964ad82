//! # Domain Layer
//!
//! Query predicate, errors and counters. No I/O.

pub mod errors;
pub mod query;
pub mod stats;
