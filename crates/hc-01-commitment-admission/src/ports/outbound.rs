//! # Outbound Ports
//!
//! Admission reaches the commitment index only through [`CommitmentSink`].
//! The node runtime decides whether that is the bus or a direct call. Either
//! way a call returns once the index has applied the mutation.

use async_trait::async_trait;
use shared_types::{CommitmentRecord, OutputKey};
use thiserror::Error;

/// How the index took an admitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkAck {
    /// The record was stored.
    Inserted,
    /// A record already lived at that key.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The store failed; the record set may be inconsistent.
    #[error("Commitment storage error: {0}")]
    Storage(String),

    #[error("Commitment channel closed (event {sequence} not delivered)")]
    ChannelClosed { sequence: u64 },

    /// The index consumed the event without reporting an outcome.
    #[error("Commitment event {sequence} not acknowledged by the index")]
    Unacknowledged { sequence: u64 },

    #[error("Index answered a {kind} event with {reply}")]
    UnexpectedReply { kind: &'static str, reply: String },
}

/// Index mutations requested by admission.
#[async_trait]
pub trait CommitmentSink: Send + Sync {
    /// Insert a validated record. A key collision is `Ok(Duplicate)`, not an error.
    async fn admit(&self, record: CommitmentRecord) -> Result<SinkAck, SinkError>;

    /// Delete the record at `key` if present. Returns the number removed.
    async fn retire(&self, key: OutputKey) -> Result<u64, SinkError>;
}

#[async_trait]
impl<S: CommitmentSink + ?Sized> CommitmentSink for std::sync::Arc<S> {
    async fn admit(&self, record: CommitmentRecord) -> Result<SinkAck, SinkError> {
        (**self).admit(record).await
    }

    async fn retire(&self, key: OutputKey) -> Result<u64, SinkError> {
        (**self).retire(key).await
    }
}
