//! # Shared Crypto - Commitment Signature Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Content digests, token signing digest |
//! | `ecdsa` | secp256k1 | Commitment signatures (DER encoded) |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces when signing
//! - **Prehash**: the token digest is computed once by the caller and signed
//!   as-is; no second hash is applied inside the signature scheme
//! - **DER**: signatures travel in ASN.1 DER form; high-S signatures are
//!   normalised before verification

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_concat, Hash};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
