//! # Commitment Token Layout
//!
//! | # | Field | Form |
//! |---|-------|------|
//! | 0 | protocol marker | ASCII |
//! | 1 | identity key | hex of SEC1 public key |
//! | 2 | content hash | 32 raw bytes |
//! | 3 | operation marker | ASCII, e.g. `advertise` |
//! | 4 | content locator | UTF-8 URL |
//! | 5 | expiry | decimal Unix seconds |
//! | 6 | content size | decimal bytes |
//! | 7 | signature | DER ECDSA over `SHA256(field0 ‖ … ‖ field6)` |

use shared_crypto::{sha256_concat, Hash};
use shared_types::{CommitmentRecord, OutputKey, Timestamp};

/// Protocol marker of hosting-commitment tokens.
pub const UHRP_PROTOCOL_ADDRESS: &str = "1UHRPYnMHPuQ5Tgb3AF8JXqwKkmZVy5hG";

/// Operation marker written by publishers. Not checked on admission.
pub const ADVERTISE_OPERATION: &str = "advertise";

/// Fields in a complete token.
pub const TOKEN_FIELD_COUNT: usize = 8;

/// Fields covered by the signature.
pub const SIGNED_FIELD_COUNT: usize = 7;

/// Field positions.
pub mod field {
    pub const PROTOCOL: usize = 0;
    pub const IDENTITY_KEY: usize = 1;
    pub const CONTENT_HASH: usize = 2;
    pub const OPERATION: usize = 3;
    pub const LOCATOR: usize = 4;
    pub const EXPIRY: usize = 5;
    pub const SIZE: usize = 6;
    pub const SIGNATURE: usize = 7;
}

/// Digest the signature is made over: SHA-256 of the raw bytes of the first
/// seven fields, concatenated with no separators.
///
/// Returns `None` when fewer than seven fields are present.
pub fn signing_digest<T: AsRef<[u8]>>(fields: &[T]) -> Option<Hash> {
    fields
        .get(..SIGNED_FIELD_COUNT)
        .map(|signed| sha256_concat(signed))
}

/// Decoded contents of a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentTerms {
    /// Field 1 as carried in the token.
    pub identity_key: Vec<u8>,
    /// Field 2.
    pub content_hash: Hash,
    /// Field 3, lossily decoded.
    pub operation: String,
    /// Field 4.
    pub content_locator: String,
    /// Field 5, absolute Unix seconds.
    pub expiry: Timestamp,
    /// Field 6.
    pub content_size: u64,
}

impl CommitmentTerms {
    /// Lowercase hex of the content hash.
    pub fn content_hash_hex(&self) -> String {
        hex::encode(self.content_hash)
    }

    /// Index entity for these terms at `key`.
    pub fn into_record(self, key: OutputKey, created_at: Timestamp) -> CommitmentRecord {
        let content_hash = self.content_hash_hex();
        CommitmentRecord {
            txid: key.txid,
            output_index: key.output_index,
            content_locator: self.content_locator,
            content_hash,
            retention_value: self.expiry,
            content_size: self.content_size,
            created_at,
        }
    }
}

/// Strict base-10 parse: ASCII digits only, no sign, no whitespace.
pub(crate) fn parse_decimal(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}
