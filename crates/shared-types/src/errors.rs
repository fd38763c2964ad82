//! # Error Types
//!
//! Errors for the shared entities.

use thiserror::Error;

/// A ledger transaction id that cannot be used as part of an `OutputKey`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputKeyError {
    /// The txid is not 64 characters long.
    #[error("txid must be 64 hex characters, got {len}")]
    BadLength { len: usize },

    /// The txid contains non-hex characters.
    #[error("txid is not hex: {txid}")]
    NotHex { txid: String },
}
