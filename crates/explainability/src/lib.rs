// explainability/src/lib.rs

//! Explainability aggregation
//!
//! Collects feature-importance signals from one or more explainers and
//! normalizes them into a single `ExplanationRecord` with a stability
//! score. The aggregation itself is pure; only the runner touches the
//! async world.

pub mod aggregate;
pub mod runner;

pub use aggregate::{aggregate, DEFAULT_TOP_K};
pub use runner::run_explainers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trust_core::{Request, Response};

/// Raw output of one explainer method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainerOutput {
    pub method_id: String,
    /// (feature_id, weight) pairs; weights may be negative
    pub features: Vec<(String, f64)>,
    /// Self-reported confidence in [0, 1]
    pub confidence: f64,
    /// Self-reported fidelity; defaults to confidence when absent
    pub fidelity: Option<f64>,
}

/// An explainer capability (SHAP, LIME, gradient, ...). Implementations
/// live outside the core; the aggregator only sees their outputs.
#[async_trait]
pub trait Explainer: Send + Sync {
    fn method_id(&self) -> &str;

    async fn explain(&self, request: &Request, response: &Response) -> ExplainerOutput;
}
