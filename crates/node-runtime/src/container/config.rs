//! # Node Configuration
//!
//! Unified configuration for the admission and index subsystems.
//!
//! ## Environment Overrides
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `HC_TOPIC` | `admission.topic` |
//! | `HC_PROTOCOL_MARKER` | `admission.protocol_marker` |
//! | `HC_SERVER_PUBLIC_KEY` | pins `admission.key_policy` to this SEC1 hex key |
//! | `HC_SERVER_PRIVATE_KEY` | pins `admission.key_policy` to the key's public half |
//! | `HC_LOOKUP_SERVICE` | `index.lookup_service` |
//! | `HC_ROCKSDB_PATH` | `index.backend = RocksDb { path }` |
//! | `HC_CHANNEL_CAPACITY` | `bus.channel_capacity` |
//!
//! A set but malformed variable is an error, never silently skipped.

use std::path::PathBuf;

use hc_01_commitment_admission::{AdmissionConfig, KeyPolicy, DEFAULT_TOPIC, UHRP_PROTOCOL_ADDRESS};
use hc_02_commitment_index::DEFAULT_LOOKUP_SERVICE;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_crypto::{Secp256k1KeyPair, Secp256k1PublicKey};
use thiserror::Error;

pub const ENV_TOPIC: &str = "HC_TOPIC";
pub const ENV_PROTOCOL_MARKER: &str = "HC_PROTOCOL_MARKER";
pub const ENV_SERVER_PUBLIC_KEY: &str = "HC_SERVER_PUBLIC_KEY";
pub const ENV_SERVER_PRIVATE_KEY: &str = "HC_SERVER_PRIVATE_KEY";
pub const ENV_LOOKUP_SERVICE: &str = "HC_LOOKUP_SERVICE";
pub const ENV_ROCKSDB_PATH: &str = "HC_ROCKSDB_PATH";
pub const ENV_CHANNEL_CAPACITY: &str = "HC_CHANNEL_CAPACITY";

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Admission configuration.
    pub admission: AdmissionSettings,
    /// Index configuration.
    pub index: IndexSettings,
    /// Bus configuration.
    pub bus: BusSettings,
}

impl NodeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(topic) = lookup(ENV_TOPIC) {
            config.admission.topic = topic;
        }
        if let Some(marker) = lookup(ENV_PROTOCOL_MARKER) {
            config.admission.protocol_marker = marker;
        }

        let pinned_public = lookup(ENV_SERVER_PUBLIC_KEY)
            .map(|hex| {
                Secp256k1PublicKey::from_hex(&hex)
                    .map_err(|e| ConfigError::invalid_env(ENV_SERVER_PUBLIC_KEY, e))
            })
            .transpose()?;
        let derived_public = lookup(ENV_SERVER_PRIVATE_KEY)
            .map(|hex| {
                Secp256k1KeyPair::from_hex(&hex)
                    .map(|keypair| keypair.public_key())
                    .map_err(|e| ConfigError::invalid_env(ENV_SERVER_PRIVATE_KEY, e))
            })
            .transpose()?;
        config.admission.key_policy = match (pinned_public, derived_public) {
            (Some(public), Some(derived)) if public != derived => {
                return Err(ConfigError::InvalidEnv {
                    var: ENV_SERVER_PUBLIC_KEY,
                    reason: format!("does not match the key derived from {ENV_SERVER_PRIVATE_KEY}"),
                });
            }
            (Some(key), _) | (None, Some(key)) => KeyPolicy::Pinned(key),
            (None, None) => KeyPolicy::IdentityField,
        };

        if let Some(service) = lookup(ENV_LOOKUP_SERVICE) {
            config.index.lookup_service = service;
        }
        if let Some(path) = lookup(ENV_ROCKSDB_PATH) {
            config.index.backend = StorageBackend::RocksDb {
                path: PathBuf::from(path),
            };
        }
        if let Some(capacity) = lookup(ENV_CHANNEL_CAPACITY) {
            config.bus.channel_capacity = capacity
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid_env(ENV_CHANNEL_CAPACITY, e))?;
        }

        Ok(config)
    }

    /// Reject settings the runtime cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admission.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if self.admission.protocol_marker.is_empty() {
            return Err(ConfigError::EmptyProtocolMarker);
        }
        if self.index.lookup_service.trim().is_empty() {
            return Err(ConfigError::EmptyLookupService);
        }
        if self.bus.channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        if matches!(self.index.backend, StorageBackend::RocksDb { .. }) && !cfg!(feature = "rocksdb")
        {
            return Err(ConfigError::RocksDbUnavailable);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("Admission topic must not be empty")]
    EmptyTopic,

    #[error("Protocol marker must not be empty")]
    EmptyProtocolMarker,

    #[error("Lookup service name must not be empty")]
    EmptyLookupService,

    #[error("Bus channel capacity must be at least 1")]
    ZeroChannelCapacity,

    #[error("RocksDB backend requested but node-runtime was built without the `rocksdb` feature")]
    RocksDbUnavailable,
}

impl ConfigError {
    fn invalid_env(var: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidEnv {
            var,
            reason: reason.to_string(),
        }
    }
}

/// Admission configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionSettings {
    /// Topic whose outputs are admitted.
    pub topic: String,
    /// Where the verifying key comes from.
    pub key_policy: KeyPolicy,
    /// Expected token field 0.
    pub protocol_marker: String,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            key_policy: KeyPolicy::IdentityField,
            protocol_marker: UHRP_PROTOCOL_ADDRESS.to_string(),
        }
    }
}

impl AdmissionSettings {
    pub fn to_admission_config(&self) -> AdmissionConfig {
        AdmissionConfig {
            topic: self.topic.clone(),
            key_policy: self.key_policy.clone(),
            protocol_marker: self.protocol_marker.clone(),
        }
    }
}

/// Index configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Service name lookups must be addressed to.
    pub lookup_service: String,
    pub backend: StorageBackend,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            lookup_service: DEFAULT_LOOKUP_SERVICE.to_string(),
            backend: StorageBackend::Memory,
        }
    }
}

/// Where commitment records are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process memory; lost on exit.
    #[default]
    Memory,
    /// RocksDB at `path`. Requires feature `rocksdb`.
    RocksDb { path: PathBuf },
}

/// Bus configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusSettings {
    /// Events buffered before admission waits on the index.
    pub channel_capacity: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
