//! # Direct Index Sink
//!
//! Connects admission straight to the commitment index, with no bus in
//! between. Each admission returns only after the index has applied it.

use async_trait::async_trait;
use hc_01_commitment_admission::{CommitmentSink, SinkAck, SinkError};
use hc_02_commitment_index::{CommitmentIndexApi, IndexError};
use shared_types::{CommitmentRecord, OutputKey};

/// [`CommitmentSink`] that applies events to an index in the caller's task.
pub struct DirectIndexSink<I: CommitmentIndexApi> {
    index: I,
}

impl<I: CommitmentIndexApi> DirectIndexSink<I> {
    pub fn new(index: I) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &I {
        &self.index
    }
}

#[async_trait]
impl<I: CommitmentIndexApi> CommitmentSink for DirectIndexSink<I> {
    async fn admit(&self, record: CommitmentRecord) -> Result<SinkAck, SinkError> {
        match self.index.insert(record) {
            Ok(()) => Ok(SinkAck::Inserted),
            Err(IndexError::DuplicateKey { .. }) => Ok(SinkAck::Duplicate),
            Err(err) => Err(SinkError::Storage(err.to_string())),
        }
    }

    async fn retire(&self, key: OutputKey) -> Result<u64, SinkError> {
        self.index
            .delete(&key)
            .map_err(|err| SinkError::Storage(err.to_string()))
    }
}
