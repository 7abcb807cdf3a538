// trust-crypto/src/entropy.rs

use rand::rngs::OsRng;
use rand_core::RngCore;

/// Randomness capability used for commitment nonces.
///
/// Isolated behind a trait so sealing is deterministic in tests.
pub trait EntropySource: Send + Sync {
    /// Fill the buffer with random bytes
    fn fill(&self, buf: &mut [u8]);
}

/// Operating-system entropy
#[derive(Debug, Default)]
pub struct OsEntropy;

impl OsEntropy {
    pub fn new() -> Self {
        Self
    }
}

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}

/// Fixed entropy for tests; fills with a repeating byte
#[derive(Debug)]
pub struct FixedEntropy {
    byte: u8,
}

impl FixedEntropy {
    pub fn new(byte: u8) -> Self {
        Self { byte }
    }
}

impl EntropySource for FixedEntropy {
    fn fill(&self, buf: &mut [u8]) {
        buf.fill(self.byte);
    }
}
