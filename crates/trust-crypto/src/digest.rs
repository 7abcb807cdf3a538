// trust-crypto/src/digest.rs

//! 32-byte digests for fingerprints, response digests, and commitments.
//!
//! The algorithm is part of the ruleset version: every digest in a record
//! is produced by the one configured algorithm, so there is no per-value
//! algorithm tag. Callers go through `HashAlgorithm::digest` rather than a
//! generic hashing trait; the only digest inputs in this system are
//! canonical byte encodings, and keeping the algorithm on the left makes
//! the ruleset pin visible at every call site.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use sha3::Sha3_256;
use std::fmt;

/// Digest width in bytes, fixed across all supported algorithms
pub const DIGEST_SIZE: usize = 32;

/// Hex characters of the short form used in log lines
const SHORT_HEX: usize = 8;

/// Supported digest algorithms. Changing the configured algorithm changes
/// every fingerprint and commitment, so it requires a ruleset bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Sha256,
    Sha3_256,
    Blake3,
}

impl HashAlgorithm {
    /// Parse the configuration name ("sha256", "sha3-256", "blake3")
    pub fn from_name(name: &str) -> Result<Self, crate::CryptoError> {
        match name {
            "sha256" => Ok(Self::Sha256),
            "sha3-256" => Ok(Self::Sha3_256),
            "blake3" => Ok(Self::Blake3),
            other => Err(crate::CryptoError::UnknownAlgorithm(other.into())),
        }
    }

    /// Configuration name of this algorithm
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha3_256 => "sha3-256",
            Self::Blake3 => "blake3",
        }
    }

    /// Digest a byte payload with this algorithm
    pub fn digest(&self, payload: &[u8]) -> Digest {
        match self {
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(payload);
                Digest(hasher.finalize().into())
            }
            Self::Sha3_256 => {
                let mut hasher = Sha3_256::new();
                hasher.update(payload);
                Digest(hasher.finalize().into())
            }
            Self::Blake3 => Digest(*blake3::hash(payload).as_bytes()),
        }
    }
}

/// A 32-byte digest value: a fingerprint, a response digest, or a
/// commitment record hash
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    pub fn new(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build from a slice; errors unless it is exactly `DIGEST_SIZE` bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self, crate::CryptoError> {
        let bytes: [u8; DIGEST_SIZE] = slice
            .try_into()
            .map_err(|_| crate::CryptoError::InvalidDigestLength(slice.len()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; DIGEST_SIZE] {
        self.0
    }

    /// The all-zero digest, used as a placeholder before sealing
    pub fn zero() -> Self {
        Self([0u8; DIGEST_SIZE])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex digest; a leading `0x` is tolerated since sinks and
    /// chain explorers commonly prefix their hashes
    pub fn from_hex(s: &str) -> Result<Self, crate::CryptoError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(stripped).map_err(|e| crate::CryptoError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Leading hex characters, for log lines and error notes
    pub fn short(&self) -> String {
        self.to_hex()[..SHORT_HEX].to_string()
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}..)", self.short())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_payload_same_digest() {
        let payload = b"canonical record bytes";
        assert_eq!(
            HashAlgorithm::Sha256.digest(payload),
            HashAlgorithm::Sha256.digest(payload)
        );
    }

    #[test]
    fn test_algorithms_disagree() {
        let payload = b"fingerprint input";
        let sha256 = HashAlgorithm::Sha256.digest(payload);
        let sha3 = HashAlgorithm::Sha3_256.digest(payload);
        let blake3 = HashAlgorithm::Blake3.digest(payload);

        assert_ne!(sha256, sha3);
        assert_ne!(sha256, blake3);
        assert_ne!(sha3, blake3);
    }

    #[test]
    fn test_hex_round_trip_with_prefix() {
        let digest = HashAlgorithm::Sha256.digest(b"x");
        let hex = digest.to_hex();

        assert_eq!(Digest::from_hex(&hex).unwrap(), digest);
        assert_eq!(Digest::from_hex(&format!("0x{}", hex)).unwrap(), digest);
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert!(matches!(
            Digest::from_slice(&[0u8; 31]),
            Err(crate::CryptoError::InvalidDigestLength(31))
        ));
        assert!(Digest::from_slice(&[0u8; DIGEST_SIZE]).is_ok());
    }

    #[test]
    fn test_short_form_in_debug() {
        let digest = Digest::new([0xab; DIGEST_SIZE]);
        assert_eq!(digest.short(), "abababab");
        assert_eq!(format!("{:?}", digest), "Digest(abababab..)");
        // Display stays full-width for canonical logs
        assert_eq!(format!("{}", digest).len(), DIGEST_SIZE * 2);
    }

    #[test]
    fn test_algorithm_names_round_trip() {
        for algo in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha3_256,
            HashAlgorithm::Blake3,
        ] {
            assert_eq!(HashAlgorithm::from_name(algo.name()).unwrap(), algo);
        }
        assert!(HashAlgorithm::from_name("md5").is_err());
    }
}
