// trust-core/src/record.rs

use crate::evidence::HallucinationEvidence;
use crate::explanation::ExplanationRecord;
use crate::trust::TrustScore;
use crate::types::Timestamp;
use crate::verdict::{ConsensusResult, ValidatorVerdict};
use serde::{Deserialize, Serialize};
use trust_crypto::{CanonicalBuffer, Canonicalize, Digest};
use uuid::Uuid;

/// Commitment nonce size in bytes
pub const NONCE_SIZE: usize = 16;

/// Receipt returned by a commitment sink on acceptance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkReceipt {
    pub receipt_id: String,
}

/// Whether the external sink ratified the commitment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkStatus {
    /// The sink accepted the commitment
    Accepted(SinkReceipt),
    /// The sink was unavailable; the record is valid but unratified
    /// and the caller may replay the commitment later
    LocalOnly,
}

/// Cryptographic handle binding a verification record to a moment in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// SHA-256 over (canonical record ‖ nonce ‖ timestamp_be)
    pub record_hash: Digest,
    pub nonce: [u8; NONCE_SIZE],
    /// Wall-clock seconds, non-decreasing within a process
    pub timestamp: Timestamp,
    /// Previous commitment's record hash when chaining is enabled
    pub prev_hash: Option<Digest>,
    pub sink_status: SinkStatus,
}

/// Everything a verification produced except the commitment.
///
/// The commitment is computed over this frozen draft, so nothing can be
/// mutated after sealing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDraft {
    pub request_id: Uuid,
    pub fingerprint: Digest,
    pub response_digest: Digest,
    /// Sorted by (level desc, span.start asc, detector_id asc)
    pub hallucinations: Vec<HallucinationEvidence>,
    /// Sorted by validator_id
    pub validators: Vec<ValidatorVerdict>,
    pub consensus: ConsensusResult,
    pub explanation: Option<ExplanationRecord>,
    pub trust: TrustScore,
    pub created_at: Timestamp,
}

impl RecordDraft {
    /// Attach the sealed commitment, producing the immutable record
    pub fn into_record(self, commitment: Commitment) -> VerificationRecord {
        VerificationRecord {
            request_id: self.request_id,
            fingerprint: self.fingerprint,
            response_digest: self.response_digest,
            hallucinations: self.hallucinations,
            validators: self.validators,
            consensus: self.consensus,
            explanation: self.explanation,
            trust: self.trust,
            commitment,
            created_at: self.created_at,
        }
    }
}

impl Canonicalize for RecordDraft {
    fn canonicalize(&self, out: &mut CanonicalBuffer) {
        out.tag("request_id").write_bytes(self.request_id.as_bytes());
        out.tag("fingerprint").write_bytes(self.fingerprint.as_bytes());
        out.tag("response_digest").write_bytes(self.response_digest.as_bytes());

        out.tag("hallucinations").write_u64(self.hallucinations.len() as u64);
        for evidence in &self.hallucinations {
            evidence.canonicalize(out);
        }

        out.tag("validators").write_u64(self.validators.len() as u64);
        for verdict in &self.validators {
            verdict.canonicalize(out);
        }

        out.tag("consensus");
        self.consensus.canonicalize(out);

        out.tag("explanation").write_option(self.explanation.as_ref(), |buf, explanation| {
            explanation.canonicalize(buf);
        });

        out.tag("trust");
        self.trust.canonicalize(out);

        out.tag("created_at").write_u64(self.created_at);
    }
}

/// Immutable output of the verification pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub request_id: Uuid,
    pub fingerprint: Digest,
    pub response_digest: Digest,
    pub hallucinations: Vec<HallucinationEvidence>,
    pub validators: Vec<ValidatorVerdict>,
    pub consensus: ConsensusResult,
    pub explanation: Option<ExplanationRecord>,
    pub trust: TrustScore,
    pub commitment: Commitment,
    pub created_at: Timestamp,
}

impl VerificationRecord {
    /// Whether the commitment reached the external sink
    pub fn sink_accepted(&self) -> bool {
        matches!(self.commitment.sink_status, SinkStatus::Accepted(_))
    }
}
