//! # RocksDB Commitment Store
//!
//! Persistent [`CommitmentStore`] for the commitment index.
//!
//! ## Column Families
//!
//! - `commitments` - sequence (u64 BE) → bincode `CommitmentRecord`
//! - `output_keys` - txid bytes ‖ output index (u32 BE) → sequence (u64 BE)
//! - `metadata` - `next_sequence`
//!
//! Iterating `commitments` yields records in insertion order. Every
//! mutation is one `WriteBatch` taken under the write lock, so the
//! uniqueness check and the write cannot interleave with another writer.

use std::path::{Path, PathBuf};

use hc_02_commitment_index::{CommitmentQuery, CommitmentStore, StoreError};
use parking_lot::RwLock;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use shared_types::{CommitmentRecord, OutputKey};

pub const CF_COMMITMENTS: &str = "commitments";
pub const CF_OUTPUT_KEYS: &str = "output_keys";
pub const CF_METADATA: &str = "metadata";

/// All column families used by the store
pub const COLUMN_FAMILIES: &[&str] = &[CF_COMMITMENTS, CF_OUTPUT_KEYS, CF_METADATA];

const NEXT_SEQUENCE_KEY: &[u8] = b"next_sequence";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl RocksDbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }

    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 4 * 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed commitment store
pub struct RocksDbCommitmentStore {
    db: RwLock<DB>,
    config: RocksDbConfig,
}

impl RocksDbCommitmentStore {
    /// Open or create a store
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| io_error("open", e))?;

        Ok(Self {
            db: RwLock::new(db),
            config,
        })
    }

    /// Open with default tuning
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(RocksDbConfig::new(path.as_ref()))
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn write_options(&self) -> rocksdb::WriteOptions {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

fn io_error(operation: &str, err: rocksdb::Error) -> StoreError {
    StoreError::Io {
        message: format!("RocksDB {operation} failed: {err}"),
    }
}

fn column<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily, StoreError> {
    db.cf_handle(name).ok_or_else(|| StoreError::Io {
        message: format!("Missing column family {name}"),
    })
}

/// Index key for an output. Malformed hex falls back to the raw txid bytes
/// so that lookups of such keys still miss cleanly.
fn output_key_bytes(key: &OutputKey) -> Vec<u8> {
    let mut bytes = hex::decode(&key.txid).unwrap_or_else(|_| key.txid.as_bytes().to_vec());
    bytes.extend_from_slice(&key.output_index.to_be_bytes());
    bytes
}

fn decode_u64(bytes: &[u8]) -> Result<u64, StoreError> {
    let array: [u8; 8] = bytes.try_into().map_err(|_| StoreError::Serialization {
        message: format!("Expected 8-byte integer, found {} bytes", bytes.len()),
    })?;
    Ok(u64::from_be_bytes(array))
}

fn decode_record(bytes: &[u8]) -> Result<CommitmentRecord, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

fn sequence_of(db: &DB, key: &OutputKey) -> Result<Option<u64>, StoreError> {
    db.get_cf(column(db, CF_OUTPUT_KEYS)?, output_key_bytes(key))
        .map_err(|e| io_error("get", e))?
        .map(|bytes| decode_u64(&bytes))
        .transpose()
}

impl CommitmentStore for RocksDbCommitmentStore {
    fn insert(&self, record: CommitmentRecord) -> Result<u64, StoreError> {
        let db = self.db.write();
        let key = record.key();
        if sequence_of(&db, &key)?.is_some() {
            return Err(StoreError::UniqueViolation { key });
        }

        let metadata = column(&db, CF_METADATA)?;
        let sequence = db
            .get_cf(metadata, NEXT_SEQUENCE_KEY)
            .map_err(|e| io_error("get", e))?
            .map(|bytes| decode_u64(&bytes))
            .transpose()?
            .unwrap_or(0);
        let encoded = bincode::serialize(&record).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;

        let mut batch = WriteBatch::default();
        batch.put_cf(column(&db, CF_COMMITMENTS)?, sequence.to_be_bytes(), encoded);
        batch.put_cf(
            column(&db, CF_OUTPUT_KEYS)?,
            output_key_bytes(&key),
            sequence.to_be_bytes(),
        );
        batch.put_cf(metadata, NEXT_SEQUENCE_KEY, (sequence + 1).to_be_bytes());
        db.write_opt(batch, &self.write_options())
            .map_err(|e| io_error("batch write", e))?;
        Ok(sequence)
    }

    fn delete(&self, key: &OutputKey) -> Result<u64, StoreError> {
        let db = self.db.write();
        let Some(sequence) = sequence_of(&db, key)? else {
            return Ok(0);
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(column(&db, CF_COMMITMENTS)?, sequence.to_be_bytes());
        batch.delete_cf(column(&db, CF_OUTPUT_KEYS)?, output_key_bytes(key));
        db.write_opt(batch, &self.write_options())
            .map_err(|e| io_error("batch write", e))?;
        Ok(1)
    }

    fn get(&self, key: &OutputKey) -> Result<Option<CommitmentRecord>, StoreError> {
        let db = self.db.read();
        let Some(sequence) = sequence_of(&db, key)? else {
            return Ok(None);
        };
        db.get_cf(column(&db, CF_COMMITMENTS)?, sequence.to_be_bytes())
            .map_err(|e| io_error("get", e))?
            .map(|bytes| decode_record(&bytes))
            .transpose()
    }

    fn find(&self, query: &CommitmentQuery) -> Result<Vec<CommitmentRecord>, StoreError> {
        let db = self.db.read();
        let mut results = Vec::new();
        for item in db.iterator_cf(column(&db, CF_COMMITMENTS)?, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| io_error("scan", e))?;
            let record = decode_record(&value)?;
            if query.matches(&record) {
                results.push(record);
            }
        }
        Ok(results)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let db = self.db.read();
        let mut count = 0;
        for item in db.iterator_cf(column(&db, CF_OUTPUT_KEYS)?, IteratorMode::Start) {
            item.map_err(|e| io_error("scan", e))?;
            count += 1;
        }
        Ok(count)
    }
}
