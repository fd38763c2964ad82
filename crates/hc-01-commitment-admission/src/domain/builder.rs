//! # Commitment Builder
//!
//! Produces signed tokens the way a publishing client does: hash the file,
//! work out the expiry, lay out fields 0..=6, sign their digest and append the
//! DER signature as field 7.

use shared_crypto::{sha256, Hash, Secp256k1KeyPair};
use shared_types::Timestamp;
use url::Url;

use super::codec::encode;
use super::errors::BuildError;
use super::token::{signing_digest, ADVERTISE_OPERATION, UHRP_PROTOCOL_ADDRESS};

/// When a commitment lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Absolute Unix seconds.
    At(Timestamp),
    /// Minutes after the `now` given to [`CommitmentBuilder::sign`].
    HostingMinutes(u64),
}

impl Expiry {
    fn resolve(self, now: Timestamp) -> Timestamp {
        match self {
            Self::At(at) => at,
            Self::HostingMinutes(minutes) => now.saturating_add(minutes.saturating_mul(60)),
        }
    }
}

/// Signed token, both as fields and as the encoded output script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCommitment {
    pub fields: Vec<Vec<u8>>,
    pub script: Vec<u8>,
    pub expiry: Timestamp,
}

/// Builder for hosting-commitment tokens.
#[derive(Debug, Clone)]
pub struct CommitmentBuilder {
    locator: String,
    content_hash: Option<Hash>,
    content_size: Option<u64>,
    expiry: Option<Expiry>,
    operation: String,
    protocol_marker: String,
}

impl CommitmentBuilder {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            content_hash: None,
            content_size: None,
            expiry: None,
            operation: ADVERTISE_OPERATION.to_string(),
            protocol_marker: UHRP_PROTOCOL_ADDRESS.to_string(),
        }
    }

    /// Hash `content` and take its length as the size unless one is set.
    pub fn content(mut self, content: &[u8]) -> Self {
        self.content_hash = Some(sha256(content));
        if self.content_size.is_none() {
            self.content_size = Some(content.len() as u64);
        }
        self
    }

    pub fn content_hash(mut self, hash: Hash) -> Self {
        self.content_hash = Some(hash);
        self
    }

    pub fn content_size(mut self, size: u64) -> Self {
        self.content_size = Some(size);
        self
    }

    pub fn expires_at(mut self, at: Timestamp) -> Self {
        self.expiry = Some(Expiry::At(at));
        self
    }

    pub fn hosting_minutes(mut self, minutes: u64) -> Self {
        self.expiry = Some(Expiry::HostingMinutes(minutes));
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn protocol_marker(mut self, marker: impl Into<String>) -> Self {
        self.protocol_marker = marker.into();
        self
    }

    /// Lay out and sign the token with `keypair`, whose compressed public key
    /// becomes the identity field.
    pub fn sign(
        &self,
        keypair: &Secp256k1KeyPair,
        now: Timestamp,
    ) -> Result<SignedCommitment, BuildError> {
        let has_host = Url::parse(&self.locator)
            .ok()
            .and_then(|url| url.host_str().map(|host| !host.is_empty()))
            .unwrap_or(false);
        if !has_host {
            return Err(BuildError::InvalidLocator {
                locator: self.locator.clone(),
            });
        }

        let content_hash = self.content_hash.ok_or(BuildError::MissingContent)?;
        let expiry = self.expiry.ok_or(BuildError::MissingExpiry)?.resolve(now);
        if expiry <= now {
            return Err(BuildError::AlreadyExpired { expiry, now });
        }
        let content_size = match self.content_size {
            Some(size) if size > 0 => size,
            _ => return Err(BuildError::ZeroSize),
        };

        let mut fields: Vec<Vec<u8>> = vec![
            self.protocol_marker.as_bytes().to_vec(),
            keypair.public_key().to_hex().into_bytes(),
            content_hash.to_vec(),
            self.operation.as_bytes().to_vec(),
            self.locator.as_bytes().to_vec(),
            expiry.to_string().into_bytes(),
            content_size.to_string().into_bytes(),
        ];

        // Check framing before paying for a signature.
        encode(&fields)?;

        let digest = signing_digest(&fields).ok_or(BuildError::MissingContent)?;
        fields.push(keypair.sign_prehash_der(&digest)?);
        let script = encode(&fields)?;

        Ok(SignedCommitment {
            fields,
            script,
            expiry,
        })
    }
}
