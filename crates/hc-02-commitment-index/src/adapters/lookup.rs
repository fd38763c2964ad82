//! # Lookup Adapter
//!
//! JSON lookup surface over the commitment index, as consumed by the overlay
//! collaborator.
//!
//! ```text
//! LookupQuestion { service, query } ──→ CommitmentQuery ──→ index.find()
//!                                                               │
//!                      OutputList { outputs } ←── matches ──────┤
//!                      Freeform { result }    ←── no match ─────┘
//! ```
//!
//! Index errors are returned as errors, never folded into a freeform answer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::CommitmentRecord;
use thiserror::Error;
use tracing::debug;

use crate::domain::errors::IndexError;
use crate::domain::query::CommitmentQuery;
use crate::ports::inbound::CommitmentIndexApi;

/// Service name lookups must be addressed to by default.
pub const DEFAULT_LOOKUP_SERVICE: &str = "ls_uhrp";

/// Freeform answer when nothing matches.
pub const NO_MATCH_MESSAGE: &str = "No matching commitments found";

const DOCUMENTATION: &str = "\
# UHRP Lookup Service

Finds live hosting commitments.

Send a query object with any of:

- `contentLocator` (alias `uhrpUrl`): exact URL
- `contentHash` (alias `fileHash`): hex SHA-256 digest, case-insensitive
- `retentionValue` (alias `retentionPeriod`): exact expiry, Unix seconds

Send each field once: a field together with its alias (for example both
`contentLocator` and `uhrpUrl`) is an invalid query.

Fields combine with AND. An empty query returns every live commitment.
Results are ledger outputs `{ txid, outputIndex }`, oldest first.
";

/// A lookup request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupQuestion {
    pub service: String,
    #[serde(default)]
    pub query: Value,
}

impl LookupQuestion {
    pub fn new(service: impl Into<String>, query: Value) -> Self {
        Self {
            service: service.into(),
            query,
        }
    }
}

/// Ledger coordinates of one matching commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputReference {
    pub txid: String,
    pub output_index: u32,
}

impl From<&CommitmentRecord> for OutputReference {
    fn from(record: &CommitmentRecord) -> Self {
        Self {
            txid: record.txid.clone(),
            output_index: record.output_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LookupAnswer {
    OutputList { outputs: Vec<OutputReference> },
    Freeform { result: String },
}

/// Static description of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    pub name: &'static str,
    pub short_description: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Lookup service {service} is not supported")]
    UnknownService { service: String },

    #[error("Invalid lookup query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Lookup service over any [`CommitmentIndexApi`].
pub struct LookupService<I: CommitmentIndexApi> {
    index: I,
    service_name: String,
}

impl<I: CommitmentIndexApi> LookupService<I> {
    pub fn new(index: I) -> Self {
        Self::with_service_name(index, DEFAULT_LOOKUP_SERVICE)
    }

    pub fn with_service_name(index: I, service_name: impl Into<String>) -> Self {
        Self {
            index,
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn lookup(&self, question: &LookupQuestion) -> Result<LookupAnswer, LookupError> {
        if question.service != self.service_name {
            return Err(LookupError::UnknownService {
                service: question.service.clone(),
            });
        }

        let query = CommitmentQuery::from_json(&question.query)
            .map_err(|e| LookupError::InvalidQuery(e.to_string()))?;
        let records = self.index.find(&query)?;
        debug!(matches = records.len(), empty_query = query.is_empty(), "Lookup answered");

        if records.is_empty() {
            return Ok(LookupAnswer::Freeform {
                result: NO_MATCH_MESSAGE.to_string(),
            });
        }
        Ok(LookupAnswer::OutputList {
            outputs: records.iter().map(OutputReference::from).collect(),
        })
    }

    pub fn documentation(&self) -> &'static str {
        DOCUMENTATION
    }

    pub fn metadata(&self) -> ServiceMetadata {
        ServiceMetadata {
            name: "UHRP Lookup Service",
            short_description: "Manages and queries UHRP commitments",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
