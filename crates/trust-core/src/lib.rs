// trust-core/src/lib.rs

//! Core data model for the verification pipeline
//!
//! This crate provides:
//! - Request/Response types and extracted claims
//! - Hallucination evidence, validator verdicts, consensus results
//! - Trust scores, commitments, and the immutable verification record
//! - The error taxonomy and the verifier configuration

pub mod claim;
pub mod config;
pub mod error;
pub mod evidence;
pub mod explanation;
pub mod fingerprint;
pub mod record;
pub mod trust;
pub mod types;
pub mod verdict;

pub use claim::{Claim, ClaimId, ClaimKind};
pub use config::{BandThresholds, CommitmentConfig, TrustWeights, VerifierConfig};
pub use error::{TimeoutScope, VerifyError, VerifyResult};
pub use evidence::{sort_evidence, EvidenceKind, HallucinationEvidence};
pub use explanation::ExplanationRecord;
pub use fingerprint::{request_fingerprint, response_digest, validator_set_id};
pub use record::{Commitment, RecordDraft, SinkReceipt, SinkStatus, VerificationRecord, NONCE_SIZE};
pub use trust::{TrustBand, TrustComponents, TrustScore};
pub use types::{Request, Response, Span, Timestamp};
pub use verdict::{ConsensusResult, ValidatorVerdict, VerdictStatus};
