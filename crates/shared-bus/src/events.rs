//! # Bus Messages
//!
//! Wrapper carried on the channel around each commitment event.

use shared_types::{Applied, CommitmentEvent, Timestamp};
use tokio::sync::oneshot;

/// What the consumer reports back for one message. The error is the
/// consumer's rendering of its failure.
pub type Delivery = Result<Applied, String>;

/// One event on the bus.
#[derive(Debug)]
pub struct BusMessage {
    /// Per-publisher sequence number, starting at 1. Queue order matches
    /// sequence order.
    pub sequence: u64,
    /// Unix time at which the event was published.
    pub published_at: Timestamp,
    /// The event itself.
    pub event: CommitmentEvent,
    /// Set when the publisher waits for the outcome.
    pub reply: Option<oneshot::Sender<Delivery>>,
}

impl BusMessage {
    /// Hand the outcome back to a waiting publisher, if there is one.
    ///
    /// Returns `false` when a reply was expected but the publisher stopped
    /// waiting.
    pub fn respond(self, delivery: Delivery) -> bool {
        match self.reply {
            Some(reply) => reply.send(delivery).is_ok(),
            None => true,
        }
    }
}
