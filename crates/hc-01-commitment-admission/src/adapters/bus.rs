//! # Event Bus Adapter
//!
//! Sends index mutations over the shared bus instead of calling the index.
//!
//! ## Event Flow
//!
//! ```text
//! [Admission (hc-01)] ──CommitmentEvent::Admitted──→ [Bus] ──→ [Index handler]
//!                     ──CommitmentEvent::Spent─────→
//!                     ←─────────── Applied / error ───────────
//! ```
//!
//! The bus is a single point-to-point channel. Every event is sent as a
//! request: the sink waits until the index handler has applied it and reports
//! the handler's answer, so storage failures and replays reach the caller.

use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::{BusError, EventPublisher};
use shared_types::{Applied, CommitmentEvent, CommitmentRecord, OutputKey};
use tracing::warn;

use crate::ports::outbound::{CommitmentSink, SinkAck, SinkError};

/// [`CommitmentSink`] that publishes onto the shared bus.
pub struct BusCommitmentSink<P: EventPublisher> {
    publisher: Arc<P>,
}

impl<P: EventPublisher> BusCommitmentSink<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    async fn send(&self, event: CommitmentEvent) -> Result<Applied, SinkError> {
        let key = event.key();
        let kind = event.kind();

        self.publisher.request(event).await.map_err(|e| {
            warn!(
                txid = %key.txid,
                output_index = key.output_index,
                kind,
                error = %e,
                "Commitment event not applied"
            );
            match e {
                BusError::ChannelClosed { sequence } => SinkError::ChannelClosed { sequence },
                BusError::Unacknowledged { sequence } => SinkError::Unacknowledged { sequence },
                BusError::Failed { reason, .. } => SinkError::Storage(reason),
            }
        })
    }
}

#[async_trait]
impl<P: EventPublisher> CommitmentSink for BusCommitmentSink<P> {
    async fn admit(&self, record: CommitmentRecord) -> Result<SinkAck, SinkError> {
        match self.send(CommitmentEvent::Admitted(record)).await? {
            Applied::Inserted => Ok(SinkAck::Inserted),
            Applied::Duplicate => Ok(SinkAck::Duplicate),
            other => Err(SinkError::UnexpectedReply {
                kind: "admitted",
                reply: format!("{other:?}"),
            }),
        }
    }

    async fn retire(&self, key: OutputKey) -> Result<u64, SinkError> {
        match self.send(CommitmentEvent::Spent(key)).await? {
            Applied::Removed { count } => Ok(count),
            other => Err(SinkError::UnexpectedReply {
                kind: "spent",
                reply: format!("{other:?}"),
            }),
        }
    }
}
