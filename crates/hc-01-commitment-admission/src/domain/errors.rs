//! # Admission Errors
//!
//! Codec failures, validator rejections and builder errors.
//!
//! Rejections are policy outcomes, not faults: an output that fails any
//! check is excluded from admission and the stream carries on.

use shared_crypto::CryptoError;
use shared_types::Timestamp;
use thiserror::Error;

/// Framing errors from the token codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A length byte declares more bytes than remain in the buffer.
    #[error("Malformed token: field at offset {offset} declares {declared} bytes, {remaining} remain")]
    MalformedToken {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// A field does not fit the one-byte length prefix.
    #[error("Field {index} is {len} bytes, longer than a length byte allows")]
    FieldTooLong { index: usize, len: usize },
}

/// Why the validator refused a token.
///
/// Exhaustive: every validation ends in `Admit` or exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RejectReason {
    /// Fewer than eight fields.
    #[error("token has fewer than 8 fields")]
    StructureError,

    /// Field 0 is not the protocol marker.
    #[error("protocol marker mismatch")]
    WrongProtocol,

    /// Field 2 is not a 32-byte SHA-256 digest.
    #[error("content hash is not a SHA-256 digest")]
    BadHash,

    /// Field 4 is not a URL with a scheme and host.
    #[error("content locator is not a valid URL")]
    BadLocator,

    /// Field 5 is not an integer after the current time.
    #[error("expiry is missing, malformed or not in the future")]
    Expired,

    /// Field 6 is not a positive integer.
    #[error("content size is missing, malformed or not positive")]
    BadSize,

    /// Field 7 does not verify over fields 0..=6.
    #[error("signature does not verify")]
    BadSignature,
}

impl RejectReason {
    /// Stable name for logs and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StructureError => "StructureError",
            Self::WrongProtocol => "WrongProtocol",
            Self::BadHash => "BadHash",
            Self::BadLocator => "BadLocator",
            Self::Expired => "Expired",
            Self::BadSize => "BadSize",
            Self::BadSignature => "BadSignature",
        }
    }
}

/// Why an output script was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The script could not be split into fields.
    #[error(transparent)]
    Malformed(#[from] CodecError),

    /// The fields do not form a valid commitment.
    #[error("commitment rejected: {0}")]
    Invalid(#[from] RejectReason),
}

impl Rejection {
    /// Stable name for logs and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "MalformedToken",
            Self::Invalid(reason) => reason.code(),
        }
    }

    /// The validator reason, if the script decoded.
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Malformed(_) => None,
            Self::Invalid(reason) => Some(*reason),
        }
    }
}

/// Errors while building a commitment token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid content locator: {locator}")]
    InvalidLocator { locator: String },

    #[error("no content or content hash supplied")]
    MissingContent,

    #[error("no expiry supplied")]
    MissingExpiry,

    #[error("expiry {expiry} is not after {now}")]
    AlreadyExpired { expiry: Timestamp, now: Timestamp },

    #[error("content size must be positive")]
    ZeroSize,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_codes() {
        let malformed = Rejection::from(CodecError::MalformedToken {
            offset: 0,
            declared: 4,
            remaining: 1,
        });
        assert_eq!(malformed.code(), "MalformedToken");
        assert_eq!(malformed.reason(), None);

        let expired = Rejection::from(RejectReason::Expired);
        assert_eq!(expired.code(), "Expired");
        assert_eq!(expired.reason(), Some(RejectReason::Expired));
    }

    #[test]
    fn test_display_mentions_detail() {
        let err = CodecError::FieldTooLong { index: 4, len: 300 };
        assert!(err.to_string().contains("300"));
        assert!(Rejection::from(RejectReason::BadSignature)
            .to_string()
            .contains("signature"));
    }
}
