//! # Index Event Handler
//!
//! Drains the admission channel into the commitment index.
//!
//! ```text
//! hc-01 Admission ──publish──→ channel ──recv──→ IndexEventHandler ──apply──→ hc-02 Index
//! ```
//!
//! Each message carries a reply channel; the handler answers it with the
//! index's outcome, so admission sees storage failures and replays.
//!
//! On shutdown the stream is closed and everything already queued is still
//! applied, so no admitted record is dropped between the two subsystems.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hc_02_commitment_index::{Applied, CommitmentIndexApi};
use shared_bus::{BusMessage, EventStream};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Counters shared between the handler task and the runtime.
#[derive(Debug)]
pub struct HandlerStats {
    applied: AtomicU64,
    duplicates: AtomicU64,
    failed: AtomicU64,
    /// Events handled so far; bumped after every message.
    progress: watch::Sender<u64>,
}

impl Default for HandlerStats {
    fn default() -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            applied: AtomicU64::default(),
            duplicates: AtomicU64::default(),
            failed: AtomicU64::default(),
            progress,
        }
    }
}

/// Point-in-time copy of [`HandlerStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerStatsSnapshot {
    /// Events that changed the index.
    pub applied: u64,
    /// Admissions for keys already indexed.
    pub duplicates: u64,
    /// Events the index could not apply.
    pub failed: u64,
}

impl HandlerStats {
    pub fn snapshot(&self) -> HandlerStatsSnapshot {
        HandlerStatsSnapshot {
            applied: self.applied.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Total events handled, whatever their outcome.
    pub fn processed(&self) -> u64 {
        let snapshot = self.snapshot();
        snapshot.applied + snapshot.duplicates + snapshot.failed
    }

    /// Wait until at least `target` events have been handled.
    ///
    /// Returns `false` if the stats were dropped first.
    pub async fn wait_for_processed(&self, target: u64) -> bool {
        let mut progress = self.progress.subscribe();
        let reached = progress.wait_for(|processed| *processed >= target).await.is_ok();
        reached
    }

    fn record_processed(&self) {
        self.progress.send_replace(self.processed());
    }
}

/// Handler applying bus messages to an index.
pub struct IndexEventHandler<I: CommitmentIndexApi> {
    stream: EventStream,
    index: I,
    stats: Arc<HandlerStats>,
}

impl<I: CommitmentIndexApi> IndexEventHandler<I> {
    pub fn new(stream: EventStream, index: I) -> Self {
        Self {
            stream,
            index,
            stats: Arc::new(HandlerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<HandlerStats> {
        Arc::clone(&self.stats)
    }

    /// Run the handler loop until `shutdown` flips to `true` or every
    /// publisher is gone.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("[hc-02] Index event handler started");

        loop {
            tokio::select! {
                message = self.stream.recv() => match message {
                    Some(message) => self.handle(message),
                    None => {
                        info!("[hc-02] Event channel closed, exiting");
                        return;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.stream.close();
        while let Some(message) = self.stream.recv().await {
            self.handle(message);
        }
        info!(
            received = self.stream.received(),
            "[hc-02] Index event handler stopped"
        );
    }

    fn handle(&self, mut message: BusMessage) {
        let sequence = message.sequence;
        let key = message.event.key();
        let kind = message.event.kind();

        let reply = message.reply.take();
        let result = self.index.apply(message.event);
        match &result {
            Ok(Applied::Duplicate) => {
                self.stats.duplicates.fetch_add(1, Ordering::Relaxed);
                debug!(sequence, output = %key, "Admission replay ignored");
            }
            Ok(applied) => {
                self.stats.applied.fetch_add(1, Ordering::Relaxed);
                debug!(sequence, output = %key, kind, ?applied, "Event applied to index");
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(sequence, output = %key, kind, error = %e, "Failed to apply event to index");
            }
        }
        self.stats.record_processed();

        if let Some(reply) = reply {
            if reply.send(result.map_err(|e| e.to_string())).is_err() {
                warn!(sequence, output = %key, "Publisher stopped waiting for index outcome");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_02_commitment_index::test_utils::{make_record, FailingStore};
    use hc_02_commitment_index::{CommitmentIndex, InMemoryCommitmentStore};
    use shared_bus::{BusError, EventPublisher};
    use shared_types::CommitmentEvent;

    #[tokio::test]
    async fn test_drains_queue_on_shutdown() {
        let (publisher, stream) = shared_bus::channel(16);
        let index = Arc::new(CommitmentIndex::new(InMemoryCommitmentStore::new()));
        let handler = IndexEventHandler::new(stream, Arc::clone(&index));
        let stats = handler.stats();

        let record = make_record(1, 0, "https://example.com/a");
        publisher
            .publish(CommitmentEvent::Admitted(record.clone()))
            .await
            .unwrap();
        publisher
            .publish(CommitmentEvent::Admitted(record.clone()))
            .await
            .unwrap();

        // Signal shutdown before the task ever runs; queued events still land.
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        handler.run(rx).await;

        assert_eq!(index.find_by_key(&record.key()).unwrap(), Some(record));
        assert_eq!(
            stats.snapshot(),
            HandlerStatsSnapshot {
                applied: 1,
                duplicates: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_exits_when_publishers_dropped() {
        let (publisher, stream) = shared_bus::channel(4);
        let index = Arc::new(CommitmentIndex::new(InMemoryCommitmentStore::new()));
        let handler = IndexEventHandler::new(stream, Arc::clone(&index));
        let (_tx, rx) = watch::channel(false);

        let record = make_record(2, 0, "https://example.com/b");
        publisher
            .publish(CommitmentEvent::Admitted(record.clone()))
            .await
            .unwrap();
        publisher
            .publish(CommitmentEvent::Spent(record.key()))
            .await
            .unwrap();
        drop(publisher);

        handler.run(rx).await;
        assert_eq!(index.find_by_key(&record.key()).unwrap(), None);
    }

    #[tokio::test]
    async fn test_replies_with_index_outcome() {
        let (publisher, stream) = shared_bus::channel(4);
        let index = Arc::new(CommitmentIndex::new(InMemoryCommitmentStore::new()));
        let handler = IndexEventHandler::new(stream, Arc::clone(&index));
        let stats = handler.stats();
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(handler.run(rx));

        let record = make_record(4, 0, "https://example.com/d");
        let admitted = CommitmentEvent::Admitted(record.clone());
        assert_eq!(publisher.request(admitted.clone()).await, Ok(Applied::Inserted));
        assert_eq!(publisher.request(admitted).await, Ok(Applied::Duplicate));
        assert_eq!(
            publisher.request(CommitmentEvent::Spent(record.key())).await,
            Ok(Applied::Removed { count: 1 })
        );
        assert!(stats.wait_for_processed(3).await);

        tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_store_failure_reaches_requester() {
        let (publisher, stream) = shared_bus::channel(4);
        let handler =
            IndexEventHandler::new(stream, CommitmentIndex::new(FailingStore::new("offline")));
        let (_tx, rx) = watch::channel(false);
        let task = tokio::spawn(handler.run(rx));

        let result = publisher
            .request(CommitmentEvent::Admitted(make_record(5, 0, "https://example.com/e")))
            .await;
        assert!(matches!(
            result,
            Err(BusError::Failed { sequence: 1, ref reason }) if reason.contains("offline")
        ));

        drop(publisher);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_store_failure_counted() {
        let (publisher, stream) = shared_bus::channel(4);
        let handler =
            IndexEventHandler::new(stream, CommitmentIndex::new(FailingStore::new("offline")));
        let stats = handler.stats();

        publisher
            .publish(CommitmentEvent::Admitted(make_record(3, 0, "https://example.com/c")))
            .await
            .unwrap();
        drop(publisher);

        let (_tx, rx) = watch::channel(false);
        handler.run(rx).await;
        assert_eq!(stats.snapshot().failed, 1);
        assert_eq!(stats.processed(), 1);
    }
}
