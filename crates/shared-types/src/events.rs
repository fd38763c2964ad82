//! # Events
//!
//! The two closed variants that cross subsystem boundaries.
//!
//! ```text
//! ledger/overlay ──LedgerEvent──→ admission (hc-01) ──CommitmentEvent──→ index (hc-02)
//! ```

use serde::{Deserialize, Serialize};

use crate::entities::{CommitmentRecord, OutputKey};

/// Notification from the ledger/overlay collaborator about one output of a
/// subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A new output was admitted to the topic. `script` is the exact byte
    /// buffer the token codec consumes.
    OutputAdded {
        txid: String,
        output_index: u32,
        script: Vec<u8>,
        topic: String,
    },
    /// A previously seen output was consumed.
    OutputSpent {
        txid: String,
        output_index: u32,
        topic: String,
    },
}

impl LedgerEvent {
    pub fn topic(&self) -> &str {
        match self {
            Self::OutputAdded { topic, .. } | Self::OutputSpent { topic, .. } => topic,
        }
    }

    pub fn txid(&self) -> &str {
        match self {
            Self::OutputAdded { txid, .. } | Self::OutputSpent { txid, .. } => txid,
        }
    }

    pub fn output_index(&self) -> u32 {
        match self {
            Self::OutputAdded { output_index, .. } | Self::OutputSpent { output_index, .. } => {
                *output_index
            }
        }
    }
}

/// Mutation of the commitment index decided by the admission subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentEvent {
    /// A validated commitment to insert.
    Admitted(CommitmentRecord),
    /// An output was spent; retire its commitment if one exists.
    Spent(OutputKey),
}

impl CommitmentEvent {
    /// Primary key the event applies to.
    pub fn key(&self) -> OutputKey {
        match self {
            Self::Admitted(record) => record.key(),
            Self::Spent(key) => key.clone(),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Admitted(_) => "admitted",
            Self::Spent(_) => "spent",
        }
    }
}

/// What applying one [`CommitmentEvent`] to the index did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Applied {
    Inserted,
    /// The key was already indexed; nothing changed.
    Duplicate,
    Removed { count: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_event_accessors() {
        let event = LedgerEvent::OutputSpent {
            txid: "aa".repeat(32),
            output_index: 2,
            topic: "tm_uhrp".into(),
        };
        assert_eq!(event.topic(), "tm_uhrp");
        assert_eq!(event.output_index(), 2);
        assert_eq!(event.txid(), "aa".repeat(32));
    }

    #[test]
    fn test_commitment_event_key() {
        let key = OutputKey::new(&"bb".repeat(32), 1).unwrap();
        let event = CommitmentEvent::Spent(key.clone());
        assert_eq!(event.key(), key);
        assert_eq!(event.kind(), "spent");
    }
}
