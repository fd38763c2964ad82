//! # Event Publisher
//!
//! Defines the publishing side of the channel.
//!
//! Sequence numbers are assigned under the channel permit, so the consumer
//! always sees them in increasing order even with concurrent publishers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Applied, CommitmentEvent, SystemTimeSource, TimeSource};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::events::{BusMessage, Delivery};
use crate::subscriber::EventStream;

/// Errors from publishing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The consuming side of the channel was dropped.
    #[error("Event channel closed (event sequence {sequence} not delivered)")]
    ChannelClosed { sequence: u64 },

    /// The consumer took the event but dropped it without answering.
    #[error("Event {sequence} was not acknowledged by the consumer")]
    Unacknowledged { sequence: u64 },

    /// The consumer could not apply the event.
    #[error("Event {sequence} failed: {reason}")]
    Failed { sequence: u64, reason: String },
}

/// Trait for publishing commitment events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event, waiting for channel capacity if necessary.
    ///
    /// # Returns
    ///
    /// The sequence number assigned to the event.
    async fn publish(&self, event: CommitmentEvent) -> Result<u64, BusError>;

    /// Publish an event and wait for the consumer to apply it.
    async fn request(&self, event: CommitmentEvent) -> Result<Applied, BusError>;

    /// Get the total number of events delivered to the channel.
    fn events_published(&self) -> u64;
}

/// Create a bounded channel and return both ends.
pub fn channel(capacity: usize) -> (ChannelPublisher, EventStream) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let publisher = ChannelPublisher {
        sender,
        next_sequence: Arc::new(Mutex::new(1)),
        events_published: Arc::new(AtomicU64::new(0)),
        capacity: capacity.max(1),
    };
    (publisher, EventStream::new(receiver))
}

/// Publishing handle; clones share the sequence counter.
#[derive(Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<BusMessage>,
    next_sequence: Arc<Mutex<u64>>,
    events_published: Arc<AtomicU64>,
    capacity: usize,
}

impl ChannelPublisher {
    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the consumer has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn enqueue(
        &self,
        event: CommitmentEvent,
        reply: Option<oneshot::Sender<Delivery>>,
    ) -> Result<u64, BusError> {
        let kind = event.kind();
        let key = event.key();

        let permit = match self.sender.reserve().await {
            Ok(permit) => permit,
            Err(_) => {
                let sequence = *self.next_sequence.lock();
                warn!(sequence, kind, output = %key, "Event dropped (channel closed)");
                return Err(BusError::ChannelClosed { sequence });
            }
        };

        // Numbering and sending happen under one lock: queue order == sequence order.
        let sequence = {
            let mut next = self.next_sequence.lock();
            let sequence = *next;
            *next += 1;
            permit.send(BusMessage {
                sequence,
                published_at: SystemTimeSource.now(),
                event,
                reply,
            });
            sequence
        };

        self.events_published.fetch_add(1, Ordering::Relaxed);
        debug!(sequence, kind, output = %key, "Event published");
        Ok(sequence)
    }
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
    async fn publish(&self, event: CommitmentEvent) -> Result<u64, BusError> {
        self.enqueue(event, None).await
    }

    async fn request(&self, event: CommitmentEvent) -> Result<Applied, BusError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let sequence = self.enqueue(event, Some(reply_tx)).await?;

        match reply_rx.await {
            Ok(Ok(applied)) => Ok(applied),
            Ok(Err(reason)) => Err(BusError::Failed { sequence, reason }),
            Err(_) => Err(BusError::Unacknowledged { sequence }),
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
