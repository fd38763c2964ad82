//! # Commitment Query
//!
//! The predicate every lookup is expressed as. Fields combine with AND; an
//! empty query matches every record.
//!
//! Wire form is a JSON object with any of `contentLocator`, `contentHash`,
//! `retentionValue`. The older names `uhrpUrl`, `fileHash` and
//! `retentionPeriod` are accepted as aliases. Unknown fields are ignored. A
//! field sent under both its name and its alias is a duplicate field and the
//! query is rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::CommitmentRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentQuery {
    #[serde(default, alias = "uhrpUrl", skip_serializing_if = "Option::is_none")]
    pub content_locator: Option<String>,

    /// Hex digest; compared case-insensitively.
    #[serde(default, alias = "fileHash", skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Matched exactly against the stored expiry.
    #[serde(default, alias = "retentionPeriod", skip_serializing_if = "Option::is_none")]
    pub retention_value: Option<u64>,
}

impl CommitmentQuery {
    /// Matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_locator(locator: impl Into<String>) -> Self {
        Self {
            content_locator: Some(locator.into()),
            ..Self::default()
        }
    }

    pub fn by_hash(hash: impl Into<String>) -> Self {
        Self {
            content_hash: Some(hash.into()),
            ..Self::default()
        }
    }

    pub fn by_retention(value: u64) -> Self {
        Self {
            retention_value: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content_locator.is_none()
            && self.content_hash.is_none()
            && self.retention_value.is_none()
    }

    /// Parse a JSON query. Anything that is not an object is the empty query.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(_) => Self::deserialize(value),
            _ => Ok(Self::default()),
        }
    }

    pub fn matches(&self, record: &CommitmentRecord) -> bool {
        if let Some(locator) = &self.content_locator {
            if record.content_locator != *locator {
                return false;
            }
        }
        if let Some(hash) = &self.content_hash {
            if !record.content_hash.eq_ignore_ascii_case(hash) {
                return false;
            }
        }
        if let Some(value) = self.retention_value {
            if record.retention_value != value {
                return false;
            }
        }
        true
    }
}
