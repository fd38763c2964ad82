//! # Ports Layer
//!
//! - `inbound`: what the ledger/overlay collaborator calls
//! - `outbound`: what admission needs from the index side

pub mod inbound;
pub mod outbound;
