// trust-core/src/verdict.rs

use serde::{Deserialize, Serialize};
use trust_crypto::{CanonicalBuffer, Canonicalize};

/// Outcome classification of a single validator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    /// Validator completed within its deadline
    Ok,
    /// Validator exceeded its per-validator deadline
    Timeout,
    /// Validator returned an error or panicked
    Error(String),
}

impl VerdictStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    fn canonical_name(&self) -> String {
        match self {
            Self::Ok => "ok".into(),
            Self::Timeout => "timeout".into(),
            Self::Error(kind) => format!("error:{}", kind),
        }
    }
}

/// One validator's verdict on a response.
///
/// Failures never surface as errors from the pool; they become verdicts
/// with `passed = false` and an explicit status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorVerdict {
    pub validator_id: String,
    pub passed: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    pub elapsed_us: u64,
    pub status: VerdictStatus,
}

impl ValidatorVerdict {
    /// A verdict for a validator that never produced one (timeout, error, panic)
    pub fn failed(validator_id: impl Into<String>, status: VerdictStatus, elapsed_us: u64) -> Self {
        Self {
            validator_id: validator_id.into(),
            passed: false,
            confidence: 0.0,
            issues: Vec::new(),
            elapsed_us,
            status,
        }
    }
}

impl Canonicalize for ValidatorVerdict {
    fn canonicalize(&self, out: &mut CanonicalBuffer) {
        out.tag("validator_id").write_str(&self.validator_id);
        out.tag("passed").write_bool(self.passed);
        out.tag("confidence").write_f64(self.confidence);
        out.tag("issues").write_u64(self.issues.len() as u64);
        for issue in &self.issues {
            out.write_str(issue);
        }
        out.tag("elapsed_us").write_u64(self.elapsed_us);
        out.tag("status").write_str(&self.status.canonical_name());
    }
}

/// Aggregated multi-validator outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Final quality score in [0, 1]; 0 when quorum is not met
    pub score: f64,
    pub weighted_pass_ratio: f64,
    /// 0.1 when all successful verdicts pass and quorum is met, else 0
    pub unanimity_bonus: f64,
    /// All collected verdicts, including timeouts and errors
    pub n_validators: u32,
    /// Verdicts with status Ok
    pub n_successful: u32,
    pub quorum_met: bool,
}

impl ConsensusResult {
    /// Result when too few validators produced usable verdicts
    pub fn no_quorum(n_validators: u32, n_successful: u32) -> Self {
        Self {
            score: 0.0,
            weighted_pass_ratio: 0.0,
            unanimity_bonus: 0.0,
            n_validators,
            n_successful,
            quorum_met: false,
        }
    }
}

impl Canonicalize for ConsensusResult {
    fn canonicalize(&self, out: &mut CanonicalBuffer) {
        out.tag("score").write_f64(self.score);
        out.tag("weighted_pass_ratio").write_f64(self.weighted_pass_ratio);
        out.tag("unanimity_bonus").write_f64(self.unanimity_bonus);
        out.tag("n_validators").write_u32(self.n_validators);
        out.tag("n_successful").write_u32(self.n_successful);
        out.tag("quorum_met").write_bool(self.quorum_met);
    }
}
