//! # Subsystem Container
//!
//! Holds the subsystem instances and wires them together.
//!
//! ## Initialization Order
//!
//! ```text
//! Phase 1: Commitment store and index (hc-02)
//! Phase 2: Lookup service over the index
//! Phase 3: Event channel
//! Phase 4: Admission (hc-01), publishing into the channel
//! ```
//!
//! The index side of the channel is returned separately so the runtime can
//! hand it to [`IndexEventHandler`](crate::handlers::IndexEventHandler).

use std::sync::Arc;

use hc_01_commitment_admission::{AdmissionService, BusCommitmentSink};
use hc_02_commitment_index::{CommitmentIndex, CommitmentStore, LookupService, StoreError};
use shared_bus::{ChannelPublisher, EventStream};
use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::storage::open_store;
use crate::container::config::{ConfigError, NodeConfig};

/// Index over whichever store the configuration selected.
pub type ConcreteCommitmentIndex = CommitmentIndex<Box<dyn CommitmentStore>>;

/// Admission publishing into the event channel.
pub type ConcreteAdmissionService = AdmissionService<BusCommitmentSink<ChannelPublisher>>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open commitment store: {0}")]
    Storage(#[from] StoreError),
}

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Commitment Index (hc-02), shared with the lookup service and the
    /// event handler.
    pub index: Arc<ConcreteCommitmentIndex>,

    /// Lookup surface over `index`.
    pub lookup: LookupService<Arc<ConcreteCommitmentIndex>>,

    /// Commitment Admission (hc-01).
    pub admission: ConcreteAdmissionService,

    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl SubsystemContainer {
    /// Build every subsystem from `config`.
    ///
    /// Returns the container and the consuming end of the admission channel.
    #[instrument(name = "subsystem_init", skip(config))]
    pub fn new(config: NodeConfig) -> Result<(Self, EventStream), ContainerError> {
        config.validate()?;
        info!("Initializing hosting commitment subsystems");

        let store = open_store(&config.index.backend)?;
        Ok(Self::assemble(config, store))
    }

    /// Build every subsystem over an already opened `store`.
    ///
    /// `config.index.backend` is not consulted.
    #[instrument(name = "subsystem_init", skip(config, store))]
    pub fn with_store(
        config: NodeConfig,
        store: Box<dyn CommitmentStore>,
    ) -> Result<(Self, EventStream), ContainerError> {
        config.validate()?;
        info!("Initializing hosting commitment subsystems over injected store");
        Ok(Self::assemble(config, store))
    }

    fn assemble(config: NodeConfig, store: Box<dyn CommitmentStore>) -> (Self, EventStream) {
        let index = Arc::new(CommitmentIndex::new(store));
        info!("  [hc-02] Commitment index initialized");

        let lookup =
            LookupService::with_service_name(Arc::clone(&index), config.index.lookup_service.clone());
        info!(service = %lookup.service_name(), "  [hc-02] Lookup service initialized");

        let (publisher, stream) = shared_bus::channel(config.bus.channel_capacity);
        info!(capacity = config.bus.channel_capacity, "  Event channel created");

        let sink = BusCommitmentSink::new(Arc::new(publisher));
        let admission = AdmissionService::new(config.admission.to_admission_config(), sink);
        info!(topic = %admission.topic(), "  [hc-01] Commitment admission initialized");

        (
            Self {
                index,
                lookup,
                admission,
                config,
            },
            stream,
        )
    }

    /// Container with default configuration and in-memory storage.
    #[cfg(test)]
    pub fn new_for_testing() -> (Self, EventStream) {
        match Self::new(NodeConfig::default()) {
            Ok(built) => built,
            Err(e) => panic!("default configuration must build: {e}"),
        }
    }
}
