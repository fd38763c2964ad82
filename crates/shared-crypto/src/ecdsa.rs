//! # ECDSA Signatures (secp256k1)
//!
//! Commitment tokens are signed over a SHA-256 digest that the caller
//! computes; the digest is handed to the curve as a prehash.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S signatures produced when signing; high-S accepted after normalisation
//! - Public keys accepted as SEC1 bytes (compressed or uncompressed) or their hex

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::hashing::Hash;
use crate::CryptoError;

/// secp256k1 public key used to verify commitment signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey(VerifyingKey);

impl Secp256k1PublicKey {
    /// Parse SEC1 encoded bytes (33-byte compressed or 65-byte uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Parse the hex form of SEC1 bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes =
            hex::decode(hex_str.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Parse either representation: ASCII hex of SEC1 bytes, or raw SEC1 bytes.
    ///
    /// Hex is tried first, since a hex string is never a valid raw SEC1 point.
    pub fn from_hex_or_raw(bytes: &[u8]) -> Result<Self, CryptoError> {
        match std::str::from_utf8(bytes) {
            Ok(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_hexdigit()) => {
                Self::from_hex(text)
            }
            _ => Self::from_sec1_bytes(bytes),
        }
    }

    /// Compressed SEC1 bytes (33 bytes).
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Lowercase hex of the compressed SEC1 bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed_bytes())
    }

    /// Verify a DER signature over an already computed digest.
    pub fn verify_prehash_der(&self, digest: &Hash, der: &[u8]) -> Result<(), CryptoError> {
        let signature = Signature::from_der(der).map_err(|_| CryptoError::InvalidSignatureFormat)?;
        // Signers outside this crate are not required to emit low-S.
        let signature = signature.normalize_s().unwrap_or(signature);

        self.0
            .verify_prehash(digest, &signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from the hex form of a 32-byte secret.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let mut bytes =
            hex::decode(hex_str.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let result = SigningKey::from_slice(&bytes)
            .map(|signing_key| Self { signing_key })
            .map_err(|_| CryptoError::InvalidPrivateKey);
        bytes.zeroize();
        result
    }

    /// Get the public key.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey(VerifyingKey::from(&self.signing_key))
    }

    /// Sign an already computed digest, returning the DER encoding.
    pub fn sign_prehash_der(&self, digest: &Hash) -> Result<Vec<u8>, CryptoError> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|_| CryptoError::SigningFailed)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        // Zeroize secret key material
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::sha256;
    use k256::Scalar;

    #[test]
    fn test_sign_verify() {
        let keypair = Secp256k1KeyPair::generate();
        let digest = sha256(b"Hello, secp256k1!");

        let der = keypair.sign_prehash_der(&digest).unwrap();
        let result = keypair.public_key().verify_prehash_der(&digest, &der);

        assert!(result.is_ok());
    }

    #[test]
    fn test_wrong_digest_fails() {
        let keypair = Secp256k1KeyPair::generate();

        let der = keypair.sign_prehash_der(&sha256(b"message1")).unwrap();
        let result = keypair
            .public_key()
            .verify_prehash_der(&sha256(b"message2"), &der);

        assert_eq!(result, Err(CryptoError::SignatureVerificationFailed));
    }

    #[test]
    fn test_high_s_signature_verifies() {
        let keypair = Secp256k1KeyPair::from_bytes([0x33u8; 32]).unwrap();
        let digest = sha256(b"signed elsewhere");

        let low = Signature::from_der(&keypair.sign_prehash_der(&digest).unwrap()).unwrap();
        let r: Scalar = *low.r();
        let s: Scalar = -*low.s();
        let high = Signature::from_scalars(r.to_bytes(), s.to_bytes()).unwrap();
        assert!(high.normalize_s().is_some());

        let der = high.to_der();
        assert_eq!(
            keypair.public_key().verify_prehash_der(&digest, der.as_bytes()),
            Ok(())
        );
    }

    #[test]
    fn test_garbage_der_is_format_error() {
        let keypair = Secp256k1KeyPair::generate();
        let result = keypair
            .public_key()
            .verify_prehash_der(&sha256(b"m"), &[0x30, 0x02, 0x01]);
        assert_eq!(result, Err(CryptoError::InvalidSignatureFormat));
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = Secp256k1KeyPair::from_bytes([0xABu8; 32]).unwrap();
        let digest = sha256(b"deterministic test");

        let sig1 = keypair.sign_prehash_der(&digest).unwrap();
        let sig2 = keypair.sign_prehash_der(&digest).unwrap();

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let keypair = Secp256k1KeyPair::from_bytes([0x11u8; 32]).unwrap();
        let hex_key = keypair.public_key().to_hex();

        assert_eq!(hex_key.len(), 66);
        assert_eq!(
            Secp256k1PublicKey::from_hex(&hex_key).unwrap(),
            keypair.public_key()
        );
    }

    #[test]
    fn test_from_hex_or_raw_accepts_both() {
        let public_key = Secp256k1KeyPair::from_bytes([0x22u8; 32])
            .unwrap()
            .public_key();

        let from_text = Secp256k1PublicKey::from_hex_or_raw(public_key.to_hex().as_bytes());
        let from_raw = Secp256k1PublicKey::from_hex_or_raw(&public_key.to_compressed_bytes());

        assert_eq!(from_text.unwrap(), public_key);
        assert_eq!(from_raw.unwrap(), public_key);
        assert!(Secp256k1PublicKey::from_hex_or_raw(b"").is_err());
    }

    #[test]
    fn test_keypair_from_hex() {
        let hex_secret = "bf4d159ac007184e0d458b7d6e3deb0e645269f55f13ba10f24e654ffc194daa";
        let keypair = Secp256k1KeyPair::from_hex(hex_secret).unwrap();
        assert_eq!(keypair.public_key().to_compressed_bytes().len(), 33);
        assert!(Secp256k1KeyPair::from_hex("00").is_err());
    }
}
