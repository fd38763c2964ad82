//! # Node Runtime
//!
//! Owns the subsystem container and the index event handler task.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Open the commitment store and build the subsystems
//! 3. Spawn the index event handler
//!
//! ## Shutdown Sequence
//!
//! 1. Signal the handler
//! 2. Handler closes the channel and applies what is still queued
//! 3. Join the handler task

use std::sync::Arc;

use anyhow::{bail, Result};
use hc_01_commitment_admission::{AdmissionApi, AdmissionError, AdmissionReport};
use hc_02_commitment_index::{
    CommitmentIndexApi, CommitmentStore, IndexError, IndexStats, LookupAnswer, LookupError,
    LookupQuestion,
};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, EventStream};
use shared_types::LedgerEvent;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::container::{ContainerError, NodeConfig, SubsystemContainer};
use crate::container::subsystems::ConcreteCommitmentIndex;
use crate::handlers::{HandlerStats, HandlerStatsSnapshot, IndexEventHandler};

type ConcreteHandler = IndexEventHandler<Arc<ConcreteCommitmentIndex>>;

/// The node runtime orchestrating both subsystems.
pub struct NodeRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<SubsystemContainer>,
    /// Handler waiting to be spawned by `start`.
    handler: Mutex<Option<ConcreteHandler>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    handler_stats: Arc<HandlerStats>,
    shutdown_tx: watch::Sender<bool>,
}

impl NodeRuntime {
    /// Create a new node runtime with configuration.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        info!("Creating hosting commitment node runtime");

        let (container, stream) = SubsystemContainer::new(config)?;
        Ok(Self::from_parts(container, stream))
    }

    /// Create a runtime whose index sits on `store` instead of the configured
    /// backend.
    pub fn with_store(
        config: NodeConfig,
        store: Box<dyn CommitmentStore>,
    ) -> Result<Self, ContainerError> {
        info!("Creating hosting commitment node runtime");

        let (container, stream) = SubsystemContainer::with_store(config, store)?;
        Ok(Self::from_parts(container, stream))
    }

    fn from_parts(container: SubsystemContainer, stream: EventStream) -> Self {
        let container = Arc::new(container);
        let handler = IndexEventHandler::new(stream, Arc::clone(&container.index));
        let handler_stats = handler.stats();
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            container,
            handler: Mutex::new(Some(handler)),
            handler_task: Mutex::new(None),
            handler_stats,
            shutdown_tx,
        }
    }

    /// Start the node runtime.
    pub async fn start(&self) -> Result<()> {
        let Some(handler) = self.handler.lock().take() else {
            bail!("Node runtime already started");
        };

        info!("===========================================");
        info!("  Hosting Commitment Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let task = tokio::spawn(handler.run(self.shutdown_tx.subscribe()));
        *self.handler_task.lock() = Some(task);

        let config = &self.container.config;
        info!("Topic: {}", config.admission.topic);
        info!("Lookup service: {}", config.index.lookup_service);
        info!("Storage: {:?}", config.index.backend);
        Ok(())
    }

    /// Feed one ledger event to admission.
    ///
    /// Returns once the handler has applied the resulting index mutation, so
    /// storage failures come back as [`AdmissionError::Sink`]. Before
    /// [`start`](Self::start) the call waits for the handler.
    pub async fn submit(&self, event: LedgerEvent) -> Result<AdmissionReport, AdmissionError> {
        self.container.admission.handle(event).await
    }

    /// Wait until the handler has applied every event published so far.
    ///
    /// Returns early if the handler is not running or shutdown begins.
    pub async fn wait_until_indexed(&self) {
        let running = self
            .handler_task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished());
        if !running {
            return;
        }

        let target = self.container.admission.sink().publisher().events_published();
        let mut shutdown = self.shutdown_tx.subscribe();
        tokio::select! {
            _ = self.handler_stats.wait_for_processed(target) => {}
            _ = shutdown.wait_for(|stopping| *stopping) => {}
        }
    }

    pub fn lookup(&self, question: &LookupQuestion) -> Result<LookupAnswer, LookupError> {
        self.container.lookup.lookup(question)
    }

    pub fn stats(&self) -> Result<IndexStats, IndexError> {
        self.container.index.stats()
    }

    pub fn handler_stats(&self) -> HandlerStatsSnapshot {
        self.handler_stats.snapshot()
    }

    /// Shutdown the node gracefully.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        self.shutdown_tx.send_replace(true);

        let task = self.handler_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("Index event handler panicked: {}", e);
            }
        }

        info!(
            applied = self.handler_stats.snapshot().applied,
            "Shutdown complete"
        );
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
