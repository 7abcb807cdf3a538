// cache/src/verdict_cache.rs

use crate::lru::{LruCache, Probe};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use trust_core::VerificationRecord;
use trust_crypto::Digest;

/// Running cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
}

/// Shared cache of sealed verification records keyed by fingerprint
pub struct VerdictCache {
    cache: Arc<RwLock<LruCache<Digest, Arc<VerificationRecord>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

impl VerdictCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity, ttl))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn get(&self, fingerprint: &Digest) -> Option<Arc<VerificationRecord>> {
        let (value, probe) = self.cache.write().unwrap().get(fingerprint);
        match probe {
            Probe::Hit => self.hits.fetch_add(1, Ordering::Relaxed),
            Probe::Miss => self.misses.fetch_add(1, Ordering::Relaxed),
            Probe::Expired => self.expirations.fetch_add(1, Ordering::Relaxed),
        };
        value
    }

    pub fn insert(&self, fingerprint: Digest, record: Arc<VerificationRecord>) {
        if self.cache.write().unwrap().insert(fingerprint, record) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.cache.write().unwrap().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use trust_core::{
        Commitment, ConsensusResult, RecordDraft, SinkStatus, TrustBand, TrustComponents,
        TrustScore, NONCE_SIZE,
    };
    use uuid::Uuid;

    pub(crate) fn record(fingerprint: Digest) -> Arc<VerificationRecord> {
        let draft = RecordDraft {
            request_id: Uuid::nil(),
            fingerprint,
            response_digest: Digest::zero(),
            hallucinations: vec![],
            validators: vec![],
            consensus: ConsensusResult::no_quorum(0, 0),
            explanation: None,
            trust: TrustScore {
                value: 0.9,
                band: TrustBand::Accept,
                components: TrustComponents {
                    hallucination_penalty: 0.0,
                    consensus: 1.0,
                    explanation: 0.5,
                    history: 0.5,
                },
            },
            created_at: 1_700_000_000,
        };
        Arc::new(draft.into_record(Commitment {
            record_hash: Digest::zero(),
            nonce: [0u8; NONCE_SIZE],
            timestamp: 1_700_000_000,
            prev_hash: None,
            sink_status: SinkStatus::LocalOnly,
        }))
    }

    #[test]
    fn test_insert_and_get() {
        let cache = VerdictCache::new(8, Duration::from_secs(600));
        let fingerprint = Digest::new([7u8; 32]);
        cache.insert(fingerprint, record(fingerprint));

        let found = cache.get(&fingerprint).unwrap();
        assert_eq!(found.fingerprint, fingerprint);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_miss_counted() {
        let cache = VerdictCache::new(8, Duration::from_secs(600));
        assert!(cache.get(&Digest::zero()).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_eviction_counted() {
        let cache = VerdictCache::new(1, Duration::from_secs(600));
        let a = Digest::new([1u8; 32]);
        let b = Digest::new([2u8; 32]);
        cache.insert(a, record(a));
        cache.insert(b, record(b));

        assert!(cache.get(&a).is_none());
        assert_eq!(cache.stats().evictions, 1);
    }
}
