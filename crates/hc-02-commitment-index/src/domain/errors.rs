//! # Domain Errors
//!
//! `DuplicateKey` is recoverable: admission treats it as a replay. Any
//! storage error means the record set may be inconsistent and must reach the
//! caller.

use shared_types::OutputKey;
use thiserror::Error;

use crate::ports::outbound::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A record already lives at this key.
    #[error("Duplicate commitment key: {key}")]
    DuplicateKey { key: OutputKey },

    /// The storage collaborator failed.
    #[error("Commitment storage error: {message}")]
    Storage { message: String },
}

impl IndexError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

impl From<StoreError> for IndexError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { key } => Self::DuplicateKey { key },
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}
