// trust-crypto/src/lib.rs

//! Cryptographic primitives for the verification pipeline
//!
//! This crate provides:
//! - 32-byte digests and the supported digest algorithms
//! - Canonical byte encoding used for fingerprints and commitments
//! - Clock and entropy capabilities so sealing stays deterministic in tests

pub mod canonical;
pub mod clock;
pub mod digest;
pub mod entropy;

pub use canonical::{CanonicalBuffer, Canonicalize};
pub use clock::{Clock, FixedClock, SystemClock};
pub use digest::{Digest, HashAlgorithm, DIGEST_SIZE};
pub use entropy::{EntropySource, FixedEntropy, OsEntropy};

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in crypto operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Digest must be 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid hex digest: {0}")]
    InvalidHex(String),
}
