//! # Core Domain Entities
//!
//! - **Ledger coordinates**: `OutputKey`
//! - **Index entity**: `CommitmentRecord`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::OutputKeyError;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Length of a ledger transaction id in hex characters.
pub const TXID_HEX_LEN: usize = 64;

/// Ledger coordinates of a single output: `(ledgerTxId, outputIndex)`.
///
/// This is the primary key of a [`CommitmentRecord`]. The txid is kept in
/// lowercase hex so that keys built from differently-cased input compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputKey {
    /// Transaction id, 64 lowercase hex characters.
    pub txid: String,
    /// Index of the output within the transaction.
    pub output_index: u32,
}

impl OutputKey {
    /// Build a key from a hex txid, normalising it to lowercase.
    pub fn new(txid: &str, output_index: u32) -> Result<Self, OutputKeyError> {
        if txid.len() != TXID_HEX_LEN {
            return Err(OutputKeyError::BadLength { len: txid.len() });
        }
        if !txid.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(OutputKeyError::NotHex {
                txid: txid.to_string(),
            });
        }
        Ok(Self {
            txid: txid.to_ascii_lowercase(),
            output_index,
        })
    }

    /// Build a key from raw txid bytes.
    pub fn from_txid_bytes(txid: &Hash, output_index: u32) -> Self {
        Self {
            txid: hex::encode(txid),
            output_index,
        }
    }
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.txid, self.output_index)
    }
}

/// A live hosting commitment, as held by the commitment index.
///
/// Records are immutable: a changed commitment appears as a new ledger
/// output with a new key, never as an update of an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentRecord {
    /// Transaction id of the output holding the token.
    #[serde(rename = "ledgerTxId")]
    pub txid: String,
    /// Output index within that transaction.
    pub output_index: u32,
    /// URL at which the committed file is claimed to be retrievable.
    pub content_locator: String,
    /// SHA-256 digest of the file, lowercase hex.
    pub content_hash: String,
    /// Token field 5: absolute Unix expiry of the commitment, in seconds.
    pub retention_value: u64,
    /// File size in bytes.
    pub content_size: u64,
    /// When the index admitted the record.
    pub created_at: Timestamp,
}

impl CommitmentRecord {
    /// Primary key of this record.
    pub fn key(&self) -> OutputKey {
        OutputKey {
            txid: self.txid.clone(),
            output_index: self.output_index,
        }
    }

    /// True when this record lives at `key`.
    pub fn has_key(&self, key: &OutputKey) -> bool {
        self.output_index == key.output_index && self.txid == key.txid
    }
}
