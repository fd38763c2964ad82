//! # Adapters
//!
//! - `memory`: `CommitmentStore` held in process memory
//! - `lookup`: JSON lookup surface over the index

pub mod lookup;
pub mod memory;
