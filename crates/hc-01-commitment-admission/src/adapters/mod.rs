//! # Adapters
//!
//! - `bus`: [`CommitmentSink`](crate::ports::outbound::CommitmentSink) over the shared bus

pub mod bus;
