// cache/src/admission.rs

use crate::verdict_cache::{CacheStats, VerdictCache};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use trust_core::{VerificationRecord, VerifyError, VerifyResult};
use trust_crypto::Digest;

type Publication = Option<VerifyResult<Arc<VerificationRecord>>>;

/// Outcome of admitting a fingerprint
pub enum AdmitOutcome {
    /// A cached record already exists
    Hit(Arc<VerificationRecord>),
    /// A verification for this fingerprint is in flight; wait for it
    Join(watch::Receiver<Publication>),
    /// This caller owns the verification; it must commit or abort the slot
    Fresh(VerificationSlot),
}

struct Shared {
    cache: VerdictCache,
    in_flight: Mutex<HashMap<Digest, watch::Receiver<Publication>>>,
}

/// Enforces at most one in-flight verification per fingerprint and
/// publishes results atomically to every waiter and the cache.
pub struct AdmissionTable {
    shared: Arc<Shared>,
}

impl AdmissionTable {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                cache: VerdictCache::new(capacity, ttl),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Check the cache, then the in-flight table, then hand out a slot
    pub fn admit(&self, fingerprint: Digest) -> AdmitOutcome {
        if let Some(record) = self.shared.cache.get(&fingerprint) {
            return AdmitOutcome::Hit(record);
        }

        let mut in_flight = self.shared.in_flight.lock().unwrap();
        if let Some(rx) = in_flight.get(&fingerprint) {
            return AdmitOutcome::Join(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        in_flight.insert(fingerprint, rx);
        AdmitOutcome::Fresh(VerificationSlot {
            fingerprint,
            shared: self.shared.clone(),
            tx: Some(tx),
            done: false,
        })
    }

    /// Wait for the in-flight owner of a fingerprint to publish
    pub async fn join(mut rx: watch::Receiver<Publication>) -> VerifyResult<Arc<VerificationRecord>> {
        match rx.wait_for(Option::is_some).await {
            Ok(publication) => publication.clone().unwrap(),
            Err(_) => Err(VerifyError::Internal(
                "verification publisher vanished".into(),
            )),
        }
    }

    /// Cache probe without admission
    pub fn lookup(&self, fingerprint: &Digest) -> Option<Arc<VerificationRecord>> {
        self.shared.cache.get(fingerprint)
    }

    /// Seed the cache with an externally produced record
    pub fn warm(&self, fingerprint: Digest, record: Arc<VerificationRecord>) {
        self.shared.cache.insert(fingerprint, record);
    }

    pub fn in_flight_count(&self) -> usize {
        self.shared.in_flight.lock().unwrap().len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.shared.cache.stats()
    }
}

/// Exclusive right to verify one fingerprint. Dropping the slot without
/// committing aborts it, so waiters can never hang on a vanished owner.
pub struct VerificationSlot {
    fingerprint: Digest,
    shared: Arc<Shared>,
    tx: Option<watch::Sender<Publication>>,
    done: bool,
}

impl VerificationSlot {
    pub fn fingerprint(&self) -> Digest {
        self.fingerprint
    }

    /// Publish the sealed record to the cache and every waiter
    pub fn commit(mut self, record: Arc<VerificationRecord>) {
        self.shared.cache.insert(self.fingerprint, record.clone());
        self.finish(Ok(record));
    }

    /// Propagate the error to every waiter
    pub fn abort(mut self, error: VerifyError) {
        self.finish(Err(error));
    }

    fn finish(&mut self, result: VerifyResult<Arc<VerificationRecord>>) {
        self.done = true;
        self.shared
            .in_flight
            .lock()
            .unwrap()
            .remove(&self.fingerprint);
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Some(result));
        }
    }
}

impl Drop for VerificationSlot {
    fn drop(&mut self) {
        if !self.done {
            tracing::warn!(
                fingerprint = %self.fingerprint,
                "verification slot dropped without publishing; aborting waiters"
            );
            self.finish(Err(VerifyError::Internal(
                "verification slot dropped without publishing".into(),
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict_cache::tests::record;

    fn table() -> AdmissionTable {
        AdmissionTable::new(16, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn test_fresh_then_hit() {
        let table = table();
        let fingerprint = Digest::new([1u8; 32]);

        let slot = match table.admit(fingerprint) {
            AdmitOutcome::Fresh(slot) => slot,
            _ => panic!("expected fresh slot"),
        };
        slot.commit(record(fingerprint));

        match table.admit(fingerprint) {
            AdmitOutcome::Hit(found) => assert_eq!(found.fingerprint, fingerprint),
            _ => panic!("expected cache hit"),
        }
        assert_eq!(table.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_joins_in_flight() {
        let table = table();
        let fingerprint = Digest::new([2u8; 32]);

        let slot = match table.admit(fingerprint) {
            AdmitOutcome::Fresh(slot) => slot,
            _ => panic!("expected fresh slot"),
        };
        let rx = match table.admit(fingerprint) {
            AdmitOutcome::Join(rx) => rx,
            _ => panic!("expected join"),
        };

        let waiter = tokio::spawn(AdmissionTable::join(rx));
        slot.commit(record(fingerprint));

        let joined = waiter.await.unwrap().unwrap();
        assert_eq!(joined.fingerprint, fingerprint);
    }

    #[tokio::test]
    async fn test_abort_propagates_to_waiters() {
        let table = table();
        let fingerprint = Digest::new([3u8; 32]);

        let slot = match table.admit(fingerprint) {
            AdmitOutcome::Fresh(slot) => slot,
            _ => panic!("expected fresh slot"),
        };
        let rx = match table.admit(fingerprint) {
            AdmitOutcome::Join(rx) => rx,
            _ => panic!("expected join"),
        };

        let waiter = tokio::spawn(AdmissionTable::join(rx));
        slot.abort(VerifyError::Backpressure);

        assert_eq!(waiter.await.unwrap().unwrap_err(), VerifyError::Backpressure);
        // Aborted fingerprints are not cached; the next admit is fresh
        assert!(matches!(table.admit(fingerprint), AdmitOutcome::Fresh(_)));
    }

    #[tokio::test]
    async fn test_dropped_slot_aborts() {
        let table = table();
        let fingerprint = Digest::new([4u8; 32]);

        let slot = match table.admit(fingerprint) {
            AdmitOutcome::Fresh(slot) => slot,
            _ => panic!("expected fresh slot"),
        };
        let rx = match table.admit(fingerprint) {
            AdmitOutcome::Join(rx) => rx,
            _ => panic!("expected join"),
        };
        drop(slot);

        let error = AdmissionTable::join(rx).await.unwrap_err();
        assert!(matches!(error, VerifyError::Internal(_)));
    }

    #[tokio::test]
    async fn test_warm_and_lookup() {
        let table = table();
        let fingerprint = Digest::new([5u8; 32]);
        assert!(table.lookup(&fingerprint).is_none());

        table.warm(fingerprint, record(fingerprint));
        assert!(table.lookup(&fingerprint).is_some());
    }
}
