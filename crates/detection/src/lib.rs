// detection/src/lib.rs

//! Hallucination detection over extracted claims
//!
//! A rule set classifies claims into the five-level taxonomy and emits
//! typed evidence. Rules are data: each is a `DetectorRule` with an id and
//! a prior weight, enumerated when the detector is built. Rule failures
//! are isolated; a panicking rule is logged and skipped, and detection
//! fails only when zero rules ran.

pub mod detector;
pub mod rule;
pub mod rules;

pub use detector::Detector;
pub use rule::{DetectionContext, DetectorRule, Fact, FactSource, RuleFinding};
pub use rules::default_rules;

/// Evidence below this confidence is dropped
pub const MIN_EVIDENCE_CONFIDENCE: f64 = 0.3;
