//! # Inbound Ports
//!
//! The API the ledger/overlay collaborator drives. Every call returns what it
//! did; nothing is broadcast to hidden listeners.

use async_trait::async_trait;
use shared_types::{CommitmentRecord, LedgerEvent};

use crate::domain::errors::Rejection;
use crate::service::AdmissionError;

/// Result of one `OutputAdded` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The token is valid and the record went to the sink. `replayed` is
    /// set when the index already held the key.
    Admitted {
        record: CommitmentRecord,
        replayed: bool,
    },
    /// The output is excluded. Not an error for the stream.
    Rejected(Rejection),
    /// The notification was for a topic this service does not track.
    Ignored { topic: String },
}

impl AdmissionOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// Result of one `OutputSpent` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendOutcome {
    /// Records removed by the index, 0 or 1.
    Retired { removed: u64 },
    Ignored { topic: String },
}

/// Either outcome, for callers that dispatch on [`LedgerEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionReport {
    Added(AdmissionOutcome),
    Spent(SpendOutcome),
}

/// Outputs of one transaction that carry admissible tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmittanceInstructions {
    /// Indices of admissible outputs, ascending.
    pub outputs_to_admit: Vec<u32>,
    /// Previously admitted inputs to keep. Hosting commitments never retain any.
    pub coins_to_retain: Vec<u32>,
}

/// Admission entry points.
#[async_trait]
pub trait AdmissionApi: Send + Sync {
    /// Decode, validate and on success insert the commitment in `script`.
    async fn on_output_added(
        &self,
        txid: &str,
        output_index: u32,
        script: &[u8],
        topic: &str,
    ) -> Result<AdmissionOutcome, AdmissionError>;

    /// Retire any commitment at `(txid, output_index)`. Absence is a no-op.
    async fn on_output_spent(
        &self,
        txid: &str,
        output_index: u32,
        topic: &str,
    ) -> Result<SpendOutcome, AdmissionError>;

    /// Dispatch a ledger event to the matching entry point.
    async fn handle(&self, event: LedgerEvent) -> Result<AdmissionReport, AdmissionError> {
        match event {
            LedgerEvent::OutputAdded {
                txid,
                output_index,
                script,
                topic,
            } => self
                .on_output_added(&txid, output_index, &script, &topic)
                .await
                .map(AdmissionReport::Added),
            LedgerEvent::OutputSpent {
                txid,
                output_index,
                topic,
            } => self
                .on_output_spent(&txid, output_index, &topic)
                .await
                .map(AdmissionReport::Spent),
        }
    }
}
