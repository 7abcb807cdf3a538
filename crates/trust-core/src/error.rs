// trust-core/src/error.rs

use serde::{Deserialize, Serialize};

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Which deadline was exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutScope {
    Validator,
    Pool,
    Global,
}

/// Errors a verification can surface to the caller.
///
/// Per-task failures inside validators, rules, and explainers never appear
/// here; they are recorded as verdicts or skipped evidence. Clone because
/// joined waiters on the same fingerprint all receive the error.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum VerifyError {
    #[error("Admission refused: too many verifications in flight")]
    Backpressure,

    #[error("Deadline exceeded: {scope:?}")]
    Timeout { scope: TimeoutScope },

    #[error("No detector rules ran successfully")]
    DetectorUnavailable,

    #[error("Quorum not met: {successful} of {required} required validators")]
    InsufficientConsensus { successful: u32, required: u32 },

    #[error("Commitment sink exhausted retries")]
    CommitmentUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VerifyError {
    /// Whether the error is attributable to the request rather than the pipeline
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Backpressure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VerifyError::Timeout {
            scope: TimeoutScope::Global,
        };
        assert!(err.to_string().contains("Global"));
    }

    #[test]
    fn test_caller_fault() {
        assert!(VerifyError::Backpressure.is_caller_fault());
        assert!(!VerifyError::DetectorUnavailable.is_caller_fault());
    }

    #[test]
    fn test_clone_for_waiters() {
        let err = VerifyError::InsufficientConsensus {
            successful: 1,
            required: 3,
        };
        assert_eq!(err.clone(), err);
    }
}
