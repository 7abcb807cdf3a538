// trust-core/src/evidence.rs

use crate::claim::ClaimId;
use crate::types::Span;
use serde::{Deserialize, Serialize};
use trust_crypto::{CanonicalBuffer, Canonicalize};

/// Five-level hallucination taxonomy. The level strictly orders severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceKind {
    /// L1: direct contradiction with a provided context fact
    FactualError,
    /// L2: citation or statistic lacking corroboration
    PlausibleFabrication,
    /// L3: claim partially matches context but a critical qualifier is missing
    PartialTruth,
    /// L4: temporally or domain-inconsistent with request metadata
    ContextualError,
    /// L5: hedge-free claim that also fails an L1 or L2 check
    ConfidentFabrication,
}

impl EvidenceKind {
    /// Severity level, 1..=5
    pub fn level(&self) -> u8 {
        match self {
            Self::FactualError => 1,
            Self::PlausibleFabrication => 2,
            Self::PartialTruth => 3,
            Self::ContextualError => 4,
            Self::ConfidentFabrication => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FactualError => "factual_error",
            Self::PlausibleFabrication => "plausible_fabrication",
            Self::PartialTruth => "partial_truth",
            Self::ContextualError => "contextual_error",
            Self::ConfidentFabrication => "confident_fabrication",
        }
    }
}

/// A detector's structured finding about one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallucinationEvidence {
    pub kind: EvidenceKind,
    pub claim: ClaimId,
    /// Span of the offending claim, kept alongside the id for ordering
    /// and audit without a claims lookup
    pub span: Span,
    /// Rule score scaled by the detector prior weight, in [0, 1]
    pub confidence: f64,
    pub detector_id: String,
    pub note: String,
}

impl HallucinationEvidence {
    pub fn level(&self) -> u8 {
        self.kind.level()
    }
}

impl Canonicalize for HallucinationEvidence {
    fn canonicalize(&self, out: &mut CanonicalBuffer) {
        out.tag("kind").write_str(self.kind.name());
        out.tag("claim").write_u32(self.claim.0);
        out.tag("span").write_u64(self.span.start as u64).write_u64(self.span.end as u64);
        out.tag("confidence").write_f64(self.confidence);
        out.tag("detector_id").write_str(&self.detector_id);
        out.tag("note").write_str(&self.note);
    }
}

/// Canonical evidence order: level descending, span start ascending,
/// detector id ascending. Applied before a record is assembled so the
/// commitment digest is invariant to detection scheduling.
pub fn sort_evidence(evidence: &mut [HallucinationEvidence]) {
    evidence.sort_by(|a, b| {
        b.level()
            .cmp(&a.level())
            .then(a.span.start.cmp(&b.span.start))
            .then(a.detector_id.cmp(&b.detector_id))
    });
}
