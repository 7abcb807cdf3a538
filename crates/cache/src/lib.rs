// cache/src/lib.rs

//! Fingerprint cache and in-flight admission
//!
//! This crate provides:
//! - An LRU + TTL cache of sealed verification records keyed by fingerprint
//! - The admission table enforcing at most one in-flight verification per
//!   fingerprint; duplicates join the in-flight future or hit the cache

pub mod admission;
pub mod lru;
pub mod verdict_cache;

pub use admission::{AdmissionTable, AdmitOutcome, VerificationSlot};
pub use lru::LruCache;
pub use verdict_cache::{CacheStats, VerdictCache};

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_imports() {
        // Smoke test
    }
}
