// trust-core/src/trust.rs

use serde::{Deserialize, Serialize};
use trust_crypto::{CanonicalBuffer, Canonicalize};

/// Coarse verdict derived from the numeric trust score plus safety overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustBand {
    Accept,
    Flag,
    Reject,
}

impl TrustBand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Flag => "flag",
            Self::Reject => "reject",
        }
    }
}

/// The weighted terms that produced a trust score, kept for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustComponents {
    pub hallucination_penalty: f64,
    pub consensus: f64,
    pub explanation: f64,
    pub history: f64,
}

/// Final trust verdict for a verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Composite score in [0, 1]
    pub value: f64,
    pub band: TrustBand,
    pub components: TrustComponents,
}

impl Canonicalize for TrustScore {
    fn canonicalize(&self, out: &mut CanonicalBuffer) {
        out.tag("value").write_f64(self.value);
        out.tag("band").write_str(self.band.name());
        out.tag("hallucination_penalty").write_f64(self.components.hallucination_penalty);
        out.tag("consensus").write_f64(self.components.consensus);
        out.tag("explanation").write_f64(self.components.explanation);
        out.tag("history").write_f64(self.components.history);
    }
}
