//! # Commitment Admission Subsystem (hc-01)
//!
//! Decides whether a ledger output carries a well-formed, unexpired,
//! correctly signed hosting commitment, and turns admitted outputs and spent
//! outputs into index mutations.
//!
//! ## Pipeline
//!
//! ```text
//! raw script ──decode──→ fields ──validate──→ Admit(terms) ──→ CommitmentRecord ──→ CommitmentSink
//!                  │                   │
//!          MalformedToken        Reject(reason)         (logged, output excluded)
//! ```
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): codec, validator and token builder; pure, no I/O
//! - **Ports Layer** (`ports/`): `AdmissionApi` (inbound), `CommitmentSink` (outbound)
//! - **Service Layer** (`service.rs`): `AdmissionService` wires domain logic to ports
//! - **Adapters** (`adapters/`): sink that publishes onto the shared bus
//!
//! ## Security Notes
//!
//! - Script bytes are attacker controlled. Every path through `decode` and
//!   `validate` returns a typed rejection; nothing panics on short, empty or
//!   oversized input.
//! - Checks run in a fixed order and stop at the first failure, so a token
//!   with several defects always reports the same reason.
//! - The signature is checked last and covers fields 0..=6 exactly.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Token fixtures and a recording sink.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use adapters::bus::BusCommitmentSink;
pub use domain::builder::{CommitmentBuilder, Expiry, SignedCommitment};
pub use domain::codec::{decode, encode, MAX_FIELD_LEN};
pub use domain::errors::{BuildError, CodecError, RejectReason, Rejection};
pub use domain::token::{
    signing_digest, CommitmentTerms, ADVERTISE_OPERATION, SIGNED_FIELD_COUNT, TOKEN_FIELD_COUNT,
    UHRP_PROTOCOL_ADDRESS,
};
pub use domain::validator::{CommitmentValidator, KeyPolicy, Verdict};
pub use ports::inbound::{
    AdmissionApi, AdmissionOutcome, AdmissionReport, AdmittanceInstructions, SpendOutcome,
};
pub use ports::outbound::{CommitmentSink, SinkAck, SinkError};
pub use service::{AdmissionConfig, AdmissionError, AdmissionService, DEFAULT_TOPIC};
