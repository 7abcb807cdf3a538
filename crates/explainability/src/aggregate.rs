// explainability/src/aggregate.rs

use crate::ExplainerOutput;
use std::collections::{BTreeMap, BTreeSet};
use trust_core::ExplanationRecord;

/// Features kept in the merged explanation
pub const DEFAULT_TOP_K: usize = 10;

/// Merge explainer outputs into one normalized explanation.
///
/// Weights are summed per feature and L1-normalized; the top-K features
/// by magnitude survive. Stability is the mean pairwise cosine similarity
/// of the per-method weight vectors over the union of their top-K
/// features; with a single method it is 1.0 and the record's method count
/// tells the composer to down-weight it.
pub fn aggregate(outputs: &[ExplainerOutput], top_k: usize) -> Option<ExplanationRecord> {
    if outputs.is_empty() {
        return None;
    }

    let mut merged: BTreeMap<String, f64> = BTreeMap::new();
    for output in outputs {
        for (feature, weight) in &output.features {
            *merged.entry(feature.clone()).or_insert(0.0) += weight;
        }
    }

    let mass: f64 = merged.values().map(|w| w.abs()).sum();
    if mass > 0.0 {
        for weight in merged.values_mut() {
            *weight /= mass;
        }
    }

    let mut top_features: Vec<(String, f64)> = merged.into_iter().collect();
    top_features.sort_by(|(fa, wa), (fb, wb)| {
        wb.abs()
            .partial_cmp(&wa.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| fa.cmp(fb))
    });
    top_features.truncate(top_k);

    let stability = if outputs.len() >= 2 {
        mean_pairwise_cosine(outputs, top_k)
    } else {
        1.0
    };

    let fidelity = outputs
        .iter()
        .map(|o| o.fidelity.unwrap_or(o.confidence))
        .sum::<f64>()
        / outputs.len() as f64;

    let min_confidence = outputs
        .iter()
        .map(|o| o.confidence.clamp(0.0, 1.0))
        .fold(1.0f64, f64::min);

    Some(ExplanationRecord {
        method_ids: outputs.iter().map(|o| o.method_id.clone()).collect(),
        top_features,
        fidelity: fidelity.clamp(0.0, 1.0),
        stability: stability.clamp(0.0, 1.0),
        confidence: (min_confidence * stability.max(0.0).sqrt()).clamp(0.0, 1.0),
    })
}

/// Per-method L1-normalized weights restricted to its top-K features
fn method_vector(output: &ExplainerOutput, top_k: usize) -> BTreeMap<&str, f64> {
    let mass: f64 = output.features.iter().map(|(_, w)| w.abs()).sum();
    let mut weights: Vec<(&str, f64)> = output
        .features
        .iter()
        .map(|(f, w)| (f.as_str(), if mass > 0.0 { w / mass } else { 0.0 }))
        .collect();
    weights.sort_by(|(fa, wa), (fb, wb)| {
        wb.abs()
            .partial_cmp(&wa.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| fa.cmp(fb))
    });
    weights.truncate(top_k);
    weights.into_iter().collect()
}

fn mean_pairwise_cosine(outputs: &[ExplainerOutput], top_k: usize) -> f64 {
    let vectors: Vec<BTreeMap<&str, f64>> =
        outputs.iter().map(|o| method_vector(o, top_k)).collect();

    let union: BTreeSet<&str> = vectors.iter().flat_map(|v| v.keys().copied()).collect();
    if union.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..vectors.len() {
        for j in (i + 1)..vectors.len() {
            total += cosine(&vectors[i], &vectors[j], &union);
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 0.0;
    }
    total / pairs as f64
}

fn cosine(a: &BTreeMap<&str, f64>, b: &BTreeMap<&str, f64>, union: &BTreeSet<&str>) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for feature in union {
        let wa = a.get(feature).copied().unwrap_or(0.0);
        let wb = b.get(feature).copied().unwrap_or(0.0);
        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
