//! # Event Stream
//!
//! The consuming side of the channel.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::events::BusMessage;

/// Receiving end of the commitment event channel.
pub struct EventStream {
    receiver: mpsc::Receiver<BusMessage>,
    received: u64,
}

impl EventStream {
    pub(crate) fn new(receiver: mpsc::Receiver<BusMessage>) -> Self {
        Self {
            receiver,
            received: 0,
        }
    }

    /// Receive the next message.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next message in publish order
    /// - `None` - Every publisher was dropped and the channel is drained
    pub async fn recv(&mut self) -> Option<BusMessage> {
        let message = self.receiver.recv().await;
        if message.is_some() {
            self.received += 1;
        }
        message
    }

    /// Try to receive the next message without blocking.
    pub fn try_recv(&mut self) -> Option<BusMessage> {
        match self.receiver.try_recv() {
            Ok(message) => {
                self.received += 1;
                Some(message)
            }
            Err(_) => None,
        }
    }

    /// Stop accepting new messages; already queued ones can still be drained.
    pub fn close(&mut self) {
        debug!(received = self.received, "Event stream closed");
        self.receiver.close();
    }

    /// Number of messages received so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Convert into a `Stream` for combinator-style consumers.
    pub fn into_stream(self) -> ReceiverStream<BusMessage> {
        ReceiverStream::new(self.receiver)
    }
}
