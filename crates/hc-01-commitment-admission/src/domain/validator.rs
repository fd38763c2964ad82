//! # Commitment Validator
//!
//! Interprets decoded fields as a hosting commitment. Checks run in a fixed
//! order and stop at the first failure:
//!
//! 1. at least eight fields, else `StructureError`
//! 2. field 0 equals the protocol marker, else `WrongProtocol`
//! 3. field 2 is a 32-byte digest, else `BadHash`
//! 4. field 4 is a URL with a host, else `BadLocator`
//! 5. field 5 is an integer greater than `now`, else `Expired`
//! 6. field 6 is an integer greater than zero, else `BadSize`
//! 7. field 7 verifies over fields 0..=6, else `BadSignature`
//!
//! Validation is pure. The clock is an argument, the key is part of the
//! validator, and no input panics.

use shared_crypto::Secp256k1PublicKey;
use shared_types::Timestamp;
use url::Url;

use super::codec::decode;
use super::errors::{RejectReason, Rejection};
use super::token::{
    field, parse_decimal, signing_digest, CommitmentTerms, TOKEN_FIELD_COUNT,
    UHRP_PROTOCOL_ADDRESS,
};

/// Where the verifying key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Parse field 1 of the token (hex or raw SEC1).
    #[default]
    IdentityField,
    /// Use one fixed service key and ignore field 1 for verification.
    Pinned(Secp256k1PublicKey),
}

/// Result of validating one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admit(CommitmentTerms),
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_admit(&self) -> bool {
        matches!(self, Self::Admit(_))
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Admit(_) => None,
            Self::Reject(reason) => Some(*reason),
        }
    }

    pub fn into_result(self) -> Result<CommitmentTerms, RejectReason> {
        match self {
            Self::Admit(terms) => Ok(terms),
            Self::Reject(reason) => Err(reason),
        }
    }
}

/// Stateless token validator. Cheap to clone, safe to share across threads.
#[derive(Debug, Clone)]
pub struct CommitmentValidator {
    policy: KeyPolicy,
    protocol_marker: String,
}

impl Default for CommitmentValidator {
    fn default() -> Self {
        Self::new(KeyPolicy::IdentityField)
    }
}

impl CommitmentValidator {
    pub fn new(policy: KeyPolicy) -> Self {
        Self {
            policy,
            protocol_marker: UHRP_PROTOCOL_ADDRESS.to_string(),
        }
    }

    /// Override the expected protocol marker.
    pub fn with_protocol_marker(mut self, marker: impl Into<String>) -> Self {
        self.protocol_marker = marker.into();
        self
    }

    pub fn policy(&self) -> &KeyPolicy {
        &self.policy
    }

    pub fn protocol_marker(&self) -> &str {
        &self.protocol_marker
    }

    /// Decode then validate a raw output script.
    pub fn evaluate_script(
        &self,
        script: &[u8],
        now: Timestamp,
    ) -> Result<CommitmentTerms, Rejection> {
        let fields = decode(script)?;
        self.validate(&fields, now)
            .into_result()
            .map_err(Rejection::from)
    }

    /// Validate decoded fields against the clock reading `now`.
    ///
    /// Fields past the eighth are ignored.
    pub fn validate<T: AsRef<[u8]>>(&self, fields: &[T], now: Timestamp) -> Verdict {
        match self.check(fields, now) {
            Ok(terms) => Verdict::Admit(terms),
            Err(reason) => Verdict::Reject(reason),
        }
    }

    fn check<T: AsRef<[u8]>>(
        &self,
        fields: &[T],
        now: Timestamp,
    ) -> Result<CommitmentTerms, RejectReason> {
        if fields.len() < TOKEN_FIELD_COUNT {
            return Err(RejectReason::StructureError);
        }
        let at = |i: usize| fields[i].as_ref();

        if at(field::PROTOCOL) != self.protocol_marker.as_bytes() {
            return Err(RejectReason::WrongProtocol);
        }

        let content_hash: [u8; 32] = at(field::CONTENT_HASH)
            .try_into()
            .map_err(|_| RejectReason::BadHash)?;

        let content_locator = parse_locator(at(field::LOCATOR)).ok_or(RejectReason::BadLocator)?;

        let expiry = parse_decimal(at(field::EXPIRY))
            .filter(|expiry| *expiry > now)
            .ok_or(RejectReason::Expired)?;

        let content_size = parse_decimal(at(field::SIZE))
            .filter(|size| *size > 0)
            .ok_or(RejectReason::BadSize)?;

        self.verify_signature(fields)?;

        Ok(CommitmentTerms {
            identity_key: at(field::IDENTITY_KEY).to_vec(),
            content_hash,
            operation: String::from_utf8_lossy(at(field::OPERATION)).into_owned(),
            content_locator,
            expiry,
            content_size,
        })
    }

    fn verify_signature<T: AsRef<[u8]>>(&self, fields: &[T]) -> Result<(), RejectReason> {
        let digest = signing_digest(fields).ok_or(RejectReason::StructureError)?;
        let signature = fields[field::SIGNATURE].as_ref();

        // An identity field that is not a key cannot vouch for anything.
        let identity_key;
        let key = match &self.policy {
            KeyPolicy::Pinned(key) => key,
            KeyPolicy::IdentityField => {
                identity_key =
                    Secp256k1PublicKey::from_hex_or_raw(fields[field::IDENTITY_KEY].as_ref())
                        .map_err(|_| RejectReason::BadSignature)?;
                &identity_key
            }
        };

        key.verify_prehash_der(&digest, signature)
            .map_err(|_| RejectReason::BadSignature)
    }
}

/// UTF-8 URL with a scheme and a non-empty host.
fn parse_locator(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    let url = Url::parse(text).ok()?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(text.to_string()),
        _ => None,
    }
}
