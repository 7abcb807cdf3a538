// verifier/src/compose.rs

use trust_core::{
    BandThresholds, ConsensusResult, ExplanationRecord, HallucinationEvidence, TrustBand,
    TrustComponents, TrustScore, TrustWeights,
};

/// Explanations backed by a single method carry less weight
pub const SINGLE_METHOD_DISCOUNT: f64 = 0.75;

/// Aggregate evidence into the hallucination penalty term:
/// `min(1, Σ (level/5) · confidence · 0.2)`
pub fn hallucination_penalty(evidence: &[HallucinationEvidence]) -> f64 {
    evidence
        .iter()
        .map(|e| (e.level() as f64 / 5.0) * e.confidence * 0.2)
        .sum::<f64>()
        .min(1.0)
}

/// Compose the final trust score and band.
///
/// The weight vector is part of the ruleset, so the composition is
/// deterministic for a given ruleset version. A verification without
/// quorum is marked rejected regardless of the numeric score; this
/// subsumes the safety override for high penalties without quorum.
pub fn compose(
    evidence: &[HallucinationEvidence],
    consensus: &ConsensusResult,
    explanation: Option<&ExplanationRecord>,
    history_rate: Option<f64>,
    weights: &TrustWeights,
    thresholds: &BandThresholds,
) -> TrustScore {
    let penalty = hallucination_penalty(evidence);
    let consensus_term = if consensus.quorum_met {
        consensus.score
    } else {
        0.0
    };
    let explanation_term = match explanation {
        Some(record) if record.single_method() => record.stability * SINGLE_METHOD_DISCOUNT,
        Some(record) => record.stability,
        None => 0.5,
    };
    let history_term = history_rate.unwrap_or(0.5).clamp(0.0, 1.0);

    let value = (weights.hallucination * (1.0 - penalty)
        + weights.consensus * consensus_term
        + weights.explanation * explanation_term
        + weights.history * history_term)
        .clamp(0.0, 1.0);

    let band = if !consensus.quorum_met {
        TrustBand::Reject
    } else if value < thresholds.reject {
        TrustBand::Reject
    } else if value < thresholds.flag {
        TrustBand::Flag
    } else {
        TrustBand::Accept
    };

    TrustScore {
        value,
        band,
        components: TrustComponents {
            hallucination_penalty: penalty,
            consensus: consensus_term,
            explanation: explanation_term,
            history: history_term,
        },
    }
}
