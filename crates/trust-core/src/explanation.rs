// trust-core/src/explanation.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use trust_crypto::{CanonicalBuffer, Canonicalize};

/// Normalized explanation produced by the explainability aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    /// Methods that contributed (e.g. "shap", "lime")
    pub method_ids: BTreeSet<String>,
    /// Top-K features after merge and L1 normalization, weight descending
    pub top_features: Vec<(String, f64)>,
    /// Mean of per-method fidelity scores
    pub fidelity: f64,
    /// Mean pairwise cosine similarity across methods; 1.0 for one method
    pub stability: f64,
    /// min(method confidences) · √stability
    pub confidence: f64,
}

impl ExplanationRecord {
    /// True when only one method contributed; the trust composer
    /// down-weights such explanations.
    pub fn single_method(&self) -> bool {
        self.method_ids.len() == 1
    }
}

impl Canonicalize for ExplanationRecord {
    fn canonicalize(&self, out: &mut CanonicalBuffer) {
        out.tag("method_ids").write_u64(self.method_ids.len() as u64);
        for id in &self.method_ids {
            out.write_str(id);
        }
        out.tag("top_features").write_u64(self.top_features.len() as u64);
        for (feature, weight) in &self.top_features {
            out.write_str(feature);
            out.write_f64(*weight);
        }
        out.tag("fidelity").write_f64(self.fidelity);
        out.tag("stability").write_f64(self.stability);
        out.tag("confidence").write_f64(self.confidence);
    }
}
