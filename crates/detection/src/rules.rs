// detection/src/rules.rs

//! Built-in detector rules, one per taxonomy level L1-L4.
//! L5 escalation lives in the detector itself because it is defined over
//! the outcomes of the L1/L2 checks.

use crate::rule::{sentence_around, DetectionContext, DetectorRule, RuleFinding};
use chrono::Datelike;
use introspection::normalized_year;
use trust_core::{Claim, ClaimKind, EvidenceKind, Response};

/// Corroboration window for statistics: ±3 orders of magnitude
const MAGNITUDE_WINDOW: f64 = 3.0;

/// The standard ruleset, in a fixed order. The order is part of the
/// ruleset version.
pub fn default_rules() -> Vec<Box<dyn DetectorRule>> {
    vec![
        Box::new(ContextContradictionRule),
        Box::new(UncorroboratedCitationRule),
        Box::new(StatisticMagnitudeRule),
        Box::new(PartialTruthRule),
        Box::new(TemporalConsistencyRule),
    ]
}

/// Significant lowercase tokens of a context key or value
fn significant_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// All numeric literals in a text
fn numbers_in(text: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() || (c == '.' && !current.is_empty()) {
            current.push(c);
        } else if !current.is_empty() {
            if let Ok(n) = current.trim_end_matches('.').parse() {
                numbers.push(n);
            }
            current.clear();
        }
    }
    if let Ok(n) = current.trim_end_matches('.').parse() {
        numbers.push(n);
    }
    numbers
}

/// L1: a context fact names a subject and its value, the response mentions
/// the subject but asserts a different entity.
pub struct ContextContradictionRule;

impl DetectorRule for ContextContradictionRule {
    fn id(&self) -> &str {
        "context-contradiction"
    }

    fn apply(
        &self,
        response: &Response,
        claims: &[Claim],
        ctx: &DetectionContext<'_>,
    ) -> Vec<RuleFinding> {
        let text_lower = response.text.to_lowercase();
        let mut findings = Vec::new();

        for (key, value) in ctx.context_values() {
            let subject = significant_tokens(key);
            if subject.is_empty() {
                continue;
            }
            if !subject.iter().all(|t| text_lower.contains(t.as_str())) {
                continue;
            }
            let expected = value.to_lowercase();
            if expected.is_empty() || text_lower.contains(&expected) {
                continue;
            }

            // The response discusses the subject without the expected value;
            // bind the contradiction to the asserted entity.
            let offending = claims.iter().find(|c| {
                matches!(c.kind, ClaimKind::Entity | ClaimKind::Other)
                    && !subject.contains(&c.normalized.to_lowercase())
                    && c.normalized.to_lowercase() != expected
            });
            if let Some(claim) = offending {
                findings.push(RuleFinding {
                    kind: EvidenceKind::FactualError,
                    claim: claim.id,
                    span: claim.span,
                    score: 0.95,
                    note: format!("context states {} = {}", key, value),
                });
            }
        }
        findings
    }
}

/// L2: citations with no corroboration in context or the fact source
pub struct UncorroboratedCitationRule;

impl DetectorRule for UncorroboratedCitationRule {
    fn id(&self) -> &str {
        "uncorroborated-citation"
    }

    fn prior_weight(&self) -> f64 {
        0.9
    }

    fn apply(
        &self,
        _response: &Response,
        claims: &[Claim],
        ctx: &DetectionContext<'_>,
    ) -> Vec<RuleFinding> {
        claims
            .iter()
            .filter(|c| c.kind == ClaimKind::Citation)
            .filter(|c| {
                let needle = c.normalized.to_lowercase();
                let in_context = ctx
                    .context_values()
                    .any(|(_, v)| v.to_lowercase().contains(&needle));
                let in_facts = ctx.facts.map_or(false, |f| f.lookup(c).is_some());
                !in_context && !in_facts
            })
            .map(|c| RuleFinding {
                kind: EvidenceKind::PlausibleFabrication,
                claim: c.id,
                span: c.span,
                score: 0.7,
                note: format!("citation {} has no corroboration", c.normalized),
            })
            .collect()
    }
}

/// L2: statistics outside the magnitude window of any corroborating value,
/// or with no corroborating value at all
pub struct StatisticMagnitudeRule;

impl DetectorRule for StatisticMagnitudeRule {
    fn id(&self) -> &str {
        "statistic-magnitude"
    }

    fn prior_weight(&self) -> f64 {
        0.85
    }

    fn apply(
        &self,
        _response: &Response,
        claims: &[Claim],
        ctx: &DetectionContext<'_>,
    ) -> Vec<RuleFinding> {
        let corroborating: Vec<f64> = ctx
            .context_values()
            .flat_map(|(_, v)| numbers_in(&v))
            .filter(|n| *n > 0.0)
            .collect();

        let mut findings = Vec::new();
        for claim in claims.iter().filter(|c| c.kind == ClaimKind::Statistic) {
            let value: f64 = match claim
                .normalized
                .split(['%', ' ', '|'])
                .next()
                .and_then(|v| v.parse().ok())
            {
                Some(v) if v > 0.0 => v,
                _ => continue,
            };

            if corroborating.is_empty() {
                findings.push(RuleFinding {
                    kind: EvidenceKind::PlausibleFabrication,
                    claim: claim.id,
                    span: claim.span,
                    score: 0.5,
                    note: "statistic unverified: no corroborating value in context".into(),
                });
                continue;
            }

            let within_window = corroborating
                .iter()
                .any(|v| (value.log10() - v.log10()).abs() <= MAGNITUDE_WINDOW);
            if !within_window {
                findings.push(RuleFinding {
                    kind: EvidenceKind::PlausibleFabrication,
                    claim: claim.id,
                    span: claim.span,
                    score: 0.8,
                    note: "statistic outside magnitude window of context values".into(),
                });
            }
        }
        findings
    }
}

/// L3: the response echoes part of a multi-token context fact but drops
/// the rest of it
pub struct PartialTruthRule;

impl DetectorRule for PartialTruthRule {
    fn id(&self) -> &str {
        "partial-truth"
    }

    fn prior_weight(&self) -> f64 {
        0.8
    }

    fn apply(
        &self,
        response: &Response,
        claims: &[Claim],
        ctx: &DetectionContext<'_>,
    ) -> Vec<RuleFinding> {
        let text_lower = response.text.to_lowercase();
        let mut findings = Vec::new();

        for (key, value) in ctx.context_values() {
            let tokens = significant_tokens(&value);
            if tokens.len() < 3 {
                continue;
            }
            let present: Vec<&String> = tokens
                .iter()
                .filter(|t| text_lower.contains(t.as_str()))
                .collect();
            if present.is_empty() || present.len() == tokens.len() {
                continue;
            }
            if present.len() * 2 < tokens.len() {
                continue;
            }

            // Echoed more than half but not all: a qualifier went missing.
            // Bind to a claim whose sentence carries one of the echoed tokens.
            let bound = claims.iter().find(|c| {
                let sentence = sentence_around(&response.text, c.span).to_lowercase();
                present.iter().any(|t| sentence.contains(t.as_str()))
            });
            if let Some(claim) = bound {
                findings.push(RuleFinding {
                    kind: EvidenceKind::PartialTruth,
                    claim: claim.id,
                    span: claim.span,
                    score: 0.6,
                    note: format!("partial match of context fact {}", key),
                });
            }
        }
        findings
    }
}

/// L4: temporal claims later than the request, unless the prompt asks
/// for forecasts
pub struct TemporalConsistencyRule;

const FORECAST_MARKERS: &[&str] = &["forecast", "predict", "projection", "will ", "expect"];

impl DetectorRule for TemporalConsistencyRule {
    fn id(&self) -> &str {
        "temporal-consistency"
    }

    fn prior_weight(&self) -> f64 {
        0.95
    }

    fn apply(
        &self,
        _response: &Response,
        claims: &[Claim],
        ctx: &DetectionContext<'_>,
    ) -> Vec<RuleFinding> {
        let forecast_requested = ctx
            .request
            .prompt_text()
            .map(str::to_lowercase)
            .map_or(false, |p| FORECAST_MARKERS.iter().any(|m| p.contains(m)));
        if forecast_requested {
            return Vec::new();
        }

        let issued_year = chrono::DateTime::from_timestamp(ctx.request.issued_at as i64, 0)
            .map(|dt| dt.year())
            .unwrap_or(i32::MAX);

        claims
            .iter()
            .filter(|c| c.kind == ClaimKind::Temporal)
            .filter_map(|c| {
                let year = normalized_year(&c.normalized)?;
                (year > issued_year).then(|| RuleFinding {
                    kind: EvidenceKind::ContextualError,
                    claim: c.id,
                    span: c.span,
                    score: 0.9,
                    note: format!("claims {} but request was issued in {}", year, issued_year),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use introspection::introspect;
    use trust_core::Request;

    fn ctx<'a>(request: &'a Request) -> DetectionContext<'a> {
        DetectionContext {
            request,
            facts: None,
        }
    }

    #[test]
    fn test_numbers_in() {
        assert_eq!(numbers_in("about 42 and 3.5 percent."), vec![42.0, 3.5]);
        assert!(numbers_in("no digits").is_empty());
    }

    #[test]
    fn test_contradiction_fires() {
        let request = Request::new("m", b"capital?".to_vec(), 1_700_000_000)
            .with_context("capital_of_France", b"Paris".to_vec());
        let response = Response::new("The capital of France is London.");
        let claims = introspect(&response);

        let findings = ContextContradictionRule.apply(&response, &claims, &ctx(&request));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, EvidenceKind::FactualError);
        assert!(findings[0].score >= 0.9);
    }

    #[test]
    fn test_contradiction_silent_when_consistent() {
        let request = Request::new("m", b"capital?".to_vec(), 1_700_000_000)
            .with_context("capital_of_France", b"Paris".to_vec());
        let response = Response::new("The capital of France is Paris.");
        let claims = introspect(&response);

        let findings = ContextContradictionRule.apply(&response, &claims, &ctx(&request));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unverified_statistic() {
        let request = Request::new("m", b"fact?".to_vec(), 1_700_000_000);
        let response = Response::new("0.0173% of humans have purple eyes.");
        let claims = introspect(&response);

        let findings = StatisticMagnitudeRule.apply(&response, &claims, &ctx(&request));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, EvidenceKind::PlausibleFabrication);
    }

    #[test]
    fn test_statistic_within_window() {
        let request = Request::new("m", b"fact?".to_vec(), 1_700_000_000)
            .with_context("rate", b"around 40 percent".to_vec());
        let response = Response::new("Roughly 42% of projects ship late.");
        let claims = introspect(&response);

        let findings = StatisticMagnitudeRule.apply(&response, &claims, &ctx(&request));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_statistic_outside_window() {
        let request = Request::new("m", b"fact?".to_vec(), 1_700_000_000)
            .with_context("population", b"8000000".to_vec());
        let response = Response::new("Only 2% of the city was counted.");
        let claims = introspect(&response);

        let findings = StatisticMagnitudeRule.apply(&response, &claims, &ctx(&request));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].score, 0.8);
    }

    #[test]
    fn test_uncorroborated_citation() {
        let request = Request::new("m", b"source?".to_vec(), 1_700_000_000);
        let response = Response::new("Proven by (Vandermeer, 1987) beyond doubt.");
        let claims = introspect(&response);

        let findings = UncorroboratedCitationRule.apply(&response, &claims, &ctx(&request));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, EvidenceKind::PlausibleFabrication);
    }

    #[test]
    fn test_future_year_flagged() {
        // issued 2025-06-01
        let request = Request::new("m", b"Summarize the final results".to_vec(), 1_748_736_000);
        let response = Response::new("The 2030 World Cup final ended 3-2.");
        let claims = introspect(&response);

        let findings = TemporalConsistencyRule.apply(&response, &claims, &ctx(&request));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, EvidenceKind::ContextualError);
    }

    #[test]
    fn test_forecast_prompt_suppresses_temporal() {
        let request = Request::new("m", b"Forecast the 2030 outcome".to_vec(), 1_748_736_000);
        let response = Response::new("Likely resolution in 2030.");
        let claims = introspect(&response);

        let findings = TemporalConsistencyRule.apply(&response, &claims, &ctx(&request));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_partial_truth() {
        let request = Request::new("m", b"growth?".to_vec(), 1_700_000_000).with_context(
            "growth_fact",
            b"revenue grew five percent after adjusting for inflation".to_vec(),
        );
        let response = Response::new("Their revenue grew five percent in 2023.");
        let claims = introspect(&response);

        let findings = PartialTruthRule.apply(&response, &claims, &ctx(&request));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, EvidenceKind::PartialTruth);
    }
}
