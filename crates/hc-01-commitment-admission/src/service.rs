//! # Admission Service
//!
//! Application service layer that implements the `AdmissionApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`AdmissionApi`)
//! - Uses the outbound port (`CommitmentSink`) for index mutations
//! - Delegates decoding and validation to the domain layer
//!
//! Rejections are returned and logged, never raised. Only a malformed txid
//! from the collaborator or a failing sink is an error.

use async_trait::async_trait;
use rayon::prelude::*;
use shared_types::{OutputKey, OutputKeyError, SystemTimeSource, TimeSource};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::errors::Rejection;
use crate::domain::token::{CommitmentTerms, UHRP_PROTOCOL_ADDRESS};
use crate::domain::validator::{CommitmentValidator, KeyPolicy};
use crate::ports::inbound::{AdmissionApi, AdmissionOutcome, AdmittanceInstructions, SpendOutcome};
use crate::ports::outbound::{CommitmentSink, SinkAck, SinkError};

/// Topic hosting commitments are published under.
pub const DEFAULT_TOPIC: &str = "tm_uhrp";

/// Admission service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Only notifications for this topic are processed.
    pub topic: String,
    pub key_policy: KeyPolicy,
    pub protocol_marker: String,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            key_policy: KeyPolicy::IdentityField,
            protocol_marker: UHRP_PROTOCOL_ADDRESS.to_string(),
        }
    }
}

/// Faults surfaced to the caller. Token rejections are not among them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("Invalid output key {txid}.{output_index}: {source}")]
    InvalidOutputKey {
        txid: String,
        output_index: u32,
        #[source]
        source: OutputKeyError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Admission service.
pub struct AdmissionService<S: CommitmentSink, T: TimeSource = SystemTimeSource> {
    validator: CommitmentValidator,
    topic: String,
    sink: S,
    clock: T,
}

impl<S: CommitmentSink> AdmissionService<S> {
    /// Create a service on the system clock.
    pub fn new(config: AdmissionConfig, sink: S) -> Self {
        Self::with_time_source(config, sink, SystemTimeSource)
    }
}

impl<S: CommitmentSink, T: TimeSource> AdmissionService<S, T> {
    pub fn with_time_source(config: AdmissionConfig, sink: S, clock: T) -> Self {
        let validator =
            CommitmentValidator::new(config.key_policy).with_protocol_marker(config.protocol_marker);
        Self {
            validator,
            topic: config.topic,
            sink,
            clock,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn validator(&self) -> &CommitmentValidator {
        &self.validator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decode and validate `script` against the current time.
    pub fn evaluate(&self, script: &[u8]) -> Result<CommitmentTerms, Rejection> {
        self.validator.evaluate_script(script, self.clock.now())
    }

    /// Indices of the outputs of one transaction that carry admissible
    /// tokens. Outputs are validated in parallel; all see the same clock
    /// reading.
    pub fn identify_admissible_outputs<B>(&self, outputs: &[B]) -> AdmittanceInstructions
    where
        B: AsRef<[u8]> + Sync,
    {
        let now = self.clock.now();
        let outputs_to_admit = outputs
            .par_iter()
            .enumerate()
            .filter_map(|(index, script)| {
                let index = u32::try_from(index).ok()?;
                self.validator
                    .evaluate_script(script.as_ref(), now)
                    .ok()
                    .map(|_| index)
            })
            .collect();

        AdmittanceInstructions {
            outputs_to_admit,
            coins_to_retain: Vec::new(),
        }
    }

    fn tracks(&self, topic: &str) -> bool {
        topic == self.topic
    }

    fn output_key(txid: &str, output_index: u32) -> Result<OutputKey, AdmissionError> {
        OutputKey::new(txid, output_index).map_err(|source| AdmissionError::InvalidOutputKey {
            txid: txid.to_string(),
            output_index,
            source,
        })
    }
}

#[async_trait]
impl<S: CommitmentSink, T: TimeSource> AdmissionApi for AdmissionService<S, T> {
    async fn on_output_added(
        &self,
        txid: &str,
        output_index: u32,
        script: &[u8],
        topic: &str,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        if !self.tracks(topic) {
            debug!(txid, output_index, topic, "Ignoring output for untracked topic");
            return Ok(AdmissionOutcome::Ignored {
                topic: topic.to_string(),
            });
        }
        let key = Self::output_key(txid, output_index)?;

        let now = self.clock.now();
        let terms = match self.validator.evaluate_script(script, now) {
            Ok(terms) => terms,
            Err(rejection) => {
                info!(
                    txid = %key.txid,
                    output_index,
                    topic,
                    reason = rejection.code(),
                    "Commitment rejected"
                );
                return Ok(AdmissionOutcome::Rejected(rejection));
            }
        };

        let record = terms.into_record(key, now);
        match self.sink.admit(record.clone()).await {
            Ok(SinkAck::Duplicate) => {
                debug!(txid = %record.txid, output_index, "Commitment already indexed (replay)");
                Ok(AdmissionOutcome::Admitted {
                    record,
                    replayed: true,
                })
            }
            Ok(SinkAck::Inserted) => {
                info!(
                    txid = %record.txid,
                    output_index,
                    locator = %record.content_locator,
                    hash = %record.content_hash,
                    "Commitment admitted"
                );
                Ok(AdmissionOutcome::Admitted {
                    record,
                    replayed: false,
                })
            }
            Err(e) => {
                error!(txid = %record.txid, output_index, error = %e, "Failed to index commitment");
                Err(e.into())
            }
        }
    }

    async fn on_output_spent(
        &self,
        txid: &str,
        output_index: u32,
        topic: &str,
    ) -> Result<SpendOutcome, AdmissionError> {
        if !self.tracks(topic) {
            debug!(txid, output_index, topic, "Ignoring spend for untracked topic");
            return Ok(SpendOutcome::Ignored {
                topic: topic.to_string(),
            });
        }
        let key = Self::output_key(txid, output_index)?;

        match self.sink.retire(key.clone()).await {
            Ok(removed) => {
                if removed == 0 {
                    debug!(output = %key, "Spend for output with no commitment");
                } else {
                    info!(output = %key, "Commitment retired");
                }
                Ok(SpendOutcome::Retired { removed })
            }
            Err(e) => {
                error!(output = %key, error = %e, "Failed to retire commitment");
                Err(e.into())
            }
        }
    }
}
