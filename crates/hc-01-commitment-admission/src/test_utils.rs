//! Fixtures shared by unit tests, the adversarial suite and the workspace
//! integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::{sha256, sha256_concat, Secp256k1KeyPair};
use shared_types::{CommitmentRecord, OutputKey, Timestamp};

use crate::domain::builder::CommitmentBuilder;
use crate::domain::codec::decode;
use crate::domain::token::field;
use crate::ports::outbound::{CommitmentSink, SinkAck, SinkError};

/// Clock reading used across fixtures.
pub const NOW: Timestamp = 1_700_000_000;

/// Default locator of [`TokenFixture`].
pub const TEST_LOCATOR: &str = "https://example.com/f";

/// Deterministic signer.
pub fn test_keypair() -> Secp256k1KeyPair {
    keypair_from_seed(0x11)
}

/// A second deterministic signer, distinct from [`test_keypair`].
pub fn alt_keypair() -> Secp256k1KeyPair {
    keypair_from_seed(0x22)
}

fn keypair_from_seed(seed: u8) -> Secp256k1KeyPair {
    match Secp256k1KeyPair::from_bytes([seed; 32]) {
        Ok(keypair) => keypair,
        Err(_) => Secp256k1KeyPair::generate(),
    }
}

/// Transaction id whose every byte is `n`.
pub fn test_txid(n: u8) -> String {
    hex::encode([n; 32])
}

pub fn test_key(n: u8, output_index: u32) -> OutputKey {
    OutputKey::from_txid_bytes(&[n; 32], output_index)
}

/// Record for [`test_key`]`(n, output_index)` as admission would build it
/// from [`TokenFixture`] at [`NOW`].
pub fn test_record(n: u8, output_index: u32) -> CommitmentRecord {
    let key = test_key(n, output_index);
    CommitmentRecord {
        txid: key.txid,
        output_index,
        content_locator: TEST_LOCATOR.to_string(),
        content_hash: hex::encode(sha256(b"hello")),
        retention_value: NOW + 3600,
        content_size: 1024,
        created_at: NOW,
    }
}

/// A valid token: `sha256("hello")` hosted at [`TEST_LOCATOR`] for an hour,
/// size 1024, signed by [`test_keypair`].
#[derive(Debug, Clone)]
pub struct TokenFixture {
    pub fields: Vec<Vec<u8>>,
    pub script: Vec<u8>,
    pub locator: String,
    pub expiry: Timestamp,
}

impl TokenFixture {
    pub fn new(now: Timestamp) -> Self {
        Self::with_locator(now, TEST_LOCATOR)
    }

    pub fn with_locator(now: Timestamp, locator: &str) -> Self {
        let signed = CommitmentBuilder::new(locator)
            .content_hash(sha256(b"hello"))
            .content_size(1024)
            .expires_at(now + 3600)
            .sign(&test_keypair(), now);

        match signed {
            Ok(signed) => Self {
                fields: signed.fields,
                script: signed.script,
                locator: locator.to_string(),
                expiry: signed.expiry,
            },
            Err(e) => panic!("fixture token failed to build: {e}"),
        }
    }
}

pub fn valid_fields(now: Timestamp) -> Vec<Vec<u8>> {
    TokenFixture::new(now).fields
}

/// Re-sign fields 0..=6 in place after a mutation.
pub fn resign(fields: &mut [Vec<u8>], keypair: &Secp256k1KeyPair) {
    let digest = sha256_concat(&fields[..field::SIGNATURE]);
    if let Ok(der) = keypair.sign_prehash_der(&digest) {
        fields[field::SIGNATURE] = der;
    }
}

/// Owned copy of the decoded fields of `script`.
pub fn fields_of(script: &[u8]) -> Vec<Vec<u8>> {
    decode(script)
        .map(|fields| fields.into_iter().map(<[u8]>::to_vec).collect())
        .unwrap_or_default()
}

/// In-memory sink that enforces key uniqueness and records every call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<CommitmentRecord>>,
    retired: Mutex<Vec<OutputKey>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CommitmentRecord> {
        self.records.lock().clone()
    }

    pub fn retired(&self) -> Vec<OutputKey> {
        self.retired.lock().clone()
    }

    /// Make every following call fail with a storage error.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock() = Some(message.to_string());
    }

    fn check_failure(&self) -> Result<(), SinkError> {
        match self.fail_with.lock().as_ref() {
            Some(message) => Err(SinkError::Storage(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CommitmentSink for RecordingSink {
    async fn admit(&self, record: CommitmentRecord) -> Result<SinkAck, SinkError> {
        self.check_failure()?;
        let mut records = self.records.lock();
        if records.iter().any(|r| r.key() == record.key()) {
            return Ok(SinkAck::Duplicate);
        }
        records.push(record);
        Ok(SinkAck::Inserted)
    }

    async fn retire(&self, key: OutputKey) -> Result<u64, SinkError> {
        self.check_failure()?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| !r.has_key(&key));
        let count = (before - records.len()) as u64;
        self.retired.lock().push(key);
        Ok(count)
    }
}
