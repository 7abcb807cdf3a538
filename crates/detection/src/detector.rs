// detection/src/detector.rs

use crate::rule::{sentence_around, DetectionContext, DetectorRule, FactSource, RuleFinding};
use crate::rules::default_rules;
use crate::MIN_EVIDENCE_CONFIDENCE;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use trust_core::{
    sort_evidence, Claim, ClaimId, EvidenceKind, HallucinationEvidence, Request, Response,
    VerifyError, VerifyResult,
};

/// Hedging markers; a claim asserted without any of these escalates to L5
/// when it already failed an L1 or L2 check
const HEDGES: &[&str] = &[
    "may", "might", "possibly", "perhaps", "reportedly", "approximately",
    "around", "roughly", "estimated", "likely", "allegedly", "about",
];

/// The detection engine: applies every rule in isolation, weights and
/// thresholds the findings, merges per claim, then runs the L5 escalation.
pub struct Detector {
    rules: Vec<Box<dyn DetectorRule>>,
}

impl Detector {
    pub fn new(rules: Vec<Box<dyn DetectorRule>>) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    /// Ids of the enumerated rules, in application order
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Classify the claims of a response into typed evidence.
    ///
    /// A panicking rule is logged and skipped; detection fails only when
    /// zero rules ran.
    pub fn detect(
        &self,
        request: &Request,
        response: &Response,
        claims: &[Claim],
        facts: Option<&dyn FactSource>,
    ) -> VerifyResult<Vec<HallucinationEvidence>> {
        let ctx = DetectionContext { request, facts };

        let mut ran = 0usize;
        let mut weighted: Vec<(String, RuleFinding)> = Vec::new();

        for rule in &self.rules {
            let outcome = catch_unwind(AssertUnwindSafe(|| rule.apply(response, claims, &ctx)));
            match outcome {
                Ok(findings) => {
                    ran += 1;
                    let prior = rule.prior_weight().clamp(0.5, 1.0);
                    for mut finding in findings {
                        finding.score = (finding.score.clamp(0.0, 1.0) * prior).clamp(0.0, 1.0);
                        weighted.push((rule.id().to_string(), finding));
                    }
                }
                Err(_) => {
                    tracing::warn!(rule = rule.id(), "detector rule panicked; skipping");
                }
            }
        }

        if ran == 0 {
            return Err(VerifyError::DetectorUnavailable);
        }

        weighted.retain(|(_, f)| f.score >= MIN_EVIDENCE_CONFIDENCE);

        let mut evidence = merge_per_claim(weighted);
        escalate_unhedged(&response.text, &mut evidence);
        evidence.retain(|e| e.confidence >= MIN_EVIDENCE_CONFIDENCE);
        sort_evidence(&mut evidence);
        Ok(evidence)
    }
}

/// When multiple rules fire on the same claim, keep the highest level and
/// sum confidences up to 1.0
fn merge_per_claim(weighted: Vec<(String, RuleFinding)>) -> Vec<HallucinationEvidence> {
    let mut by_claim: BTreeMap<ClaimId, Vec<(String, RuleFinding)>> = BTreeMap::new();
    for (rule_id, finding) in weighted {
        by_claim.entry(finding.claim).or_default().push((rule_id, finding));
    }

    by_claim
        .into_values()
        .map(|mut group| {
            group.sort_by(|(id_a, a), (id_b, b)| {
                b.kind
                    .level()
                    .cmp(&a.kind.level())
                    .then(id_a.cmp(id_b))
            });
            let total: f64 = group.iter().map(|(_, f)| f.score).sum();
            let (rule_id, top) = group.into_iter().next().unwrap();
            HallucinationEvidence {
                kind: top.kind,
                claim: top.claim,
                span: top.span,
                confidence: total.min(1.0),
                detector_id: rule_id,
                note: top.note,
            }
        })
        .collect()
}

/// L5 escalation: claims that failed an L1 or L2 check without hedging
/// language in their sentence also get ConfidentFabrication evidence
fn escalate_unhedged(text: &str, evidence: &mut Vec<HallucinationEvidence>) {
    let escalations: Vec<HallucinationEvidence> = evidence
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EvidenceKind::FactualError | EvidenceKind::PlausibleFabrication
            )
        })
        .filter(|e| {
            let sentence = sentence_around(text, e.span).to_lowercase();
            !sentence
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| HEDGES.contains(&token))
        })
        .map(|base| HallucinationEvidence {
            kind: EvidenceKind::ConfidentFabrication,
            claim: base.claim,
            span: base.span,
            confidence: base.confidence,
            detector_id: "confident-fabrication".into(),
            note: format!("unhedged claim failing {}", base.detector_id),
        })
        .collect();
    evidence.extend(escalations);
}
