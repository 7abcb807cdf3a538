// commitment/src/seal.rs

use std::sync::{Arc, Mutex};
use trust_core::{
    Commitment, CommitmentConfig, RecordDraft, SinkStatus, VerifyResult, NONCE_SIZE,
};
use trust_crypto::{Canonicalize, Clock, Digest, EntropySource, HashAlgorithm};

/// Digest of the canonical draft alone, with nonce and timestamp
/// excluded. Two verifications of identical inputs under the same
/// ruleset produce the same dedup digest even though their sealed
/// commitments differ.
pub fn dedup_digest(draft: &RecordDraft, algorithm: HashAlgorithm) -> Digest {
    draft.canonical_digest(algorithm)
}

/// Seals verification drafts into commitments.
///
/// Wall clock and entropy come in as capabilities, so tests seal
/// deterministically. When chaining is on, each commitment carries the
/// previous one's record hash.
pub struct Sealer {
    algorithm: HashAlgorithm,
    chain: bool,
    clock: Arc<dyn Clock>,
    entropy: Arc<dyn EntropySource>,
    last_hash: Mutex<Option<Digest>>,
}

impl Sealer {
    pub fn new(
        config: &CommitmentConfig,
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn EntropySource>,
    ) -> VerifyResult<Self> {
        Ok(Self {
            algorithm: config.algorithm()?,
            chain: config.chain,
            clock,
            entropy,
            last_hash: Mutex::new(None),
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Compute the commitment over a frozen draft.
    ///
    /// `record_hash = H(canonical_draft ‖ nonce ‖ timestamp_be)`. The
    /// sink status starts as `LocalOnly` and flips to `Accepted` only
    /// after the sink ratifies the hash.
    pub fn seal(&self, draft: &RecordDraft) -> Commitment {
        let mut payload = draft.canonical_bytes();

        let mut nonce = [0u8; NONCE_SIZE];
        self.entropy.fill(&mut nonce);
        payload.extend_from_slice(&nonce);

        let timestamp = self.clock.now_unix();
        payload.extend_from_slice(&timestamp.to_be_bytes());

        let record_hash = self.algorithm.digest(&payload);

        let prev_hash = if self.chain {
            let mut last = self.last_hash.lock().unwrap();
            std::mem::replace(&mut *last, Some(record_hash))
        } else {
            None
        };

        Commitment {
            record_hash,
            nonce,
            timestamp,
            prev_hash,
            sink_status: SinkStatus::LocalOnly,
        }
    }
}
