// trust-core/src/config.rs

use crate::error::{VerifyError, VerifyResult};
use crate::record::NONCE_SIZE;
use serde::{Deserialize, Serialize};
use trust_crypto::HashAlgorithm;

/// Weights of the trust score terms. Part of the ruleset: changing them
/// requires bumping `ruleset_version` so digests stay comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    pub hallucination: f64,
    pub consensus: f64,
    pub explanation: f64,
    pub history: f64,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            hallucination: 0.35,
            consensus: 0.30,
            explanation: 0.20,
            history: 0.15,
        }
    }
}

/// Band cut-offs: value < reject → Reject, value < flag → Flag, else Accept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub reject: f64,
    pub flag: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            reject: 0.50,
            flag: 0.75,
        }
    }
}

/// Commitment sealing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentConfig {
    /// "sha256", "sha3-256", or "blake3"
    pub hash_algo: String,
    pub nonce_bytes: usize,
    /// Chain each commitment to the previous one via prev_hash
    pub chain: bool,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            hash_algo: "sha256".into(),
            nonce_bytes: NONCE_SIZE,
            chain: false,
        }
    }
}

impl CommitmentConfig {
    pub fn algorithm(&self) -> VerifyResult<HashAlgorithm> {
        HashAlgorithm::from_name(&self.hash_algo)
            .map_err(|e| VerifyError::InvalidInput(e.to_string()))
    }
}

/// Configuration of the verification pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Minimum successful verdicts for a meaningful consensus score
    pub min_validators: u32,
    pub per_validator_deadline_ms: u64,
    pub pool_deadline_ms: u64,
    pub global_deadline_ms: u64,
    pub cache_capacity: usize,
    pub cache_ttl_s: u64,
    pub trust_weights: TrustWeights,
    pub band_thresholds: BandThresholds,
    /// Count timed-out verdicts toward n_validators
    pub count_timeout_verdicts: bool,
    pub commitment: CommitmentConfig,
    /// Versioned bundle of rules, weights, thresholds, and serialization
    /// conventions; part of every fingerprint
    pub ruleset_version: String,
    /// Concurrent verification admission limit
    pub max_in_flight: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            min_validators: 3,
            per_validator_deadline_ms: 250,
            pool_deadline_ms: 500,
            global_deadline_ms: 1500,
            cache_capacity: 4096,
            cache_ttl_s: 600,
            trust_weights: TrustWeights::default(),
            band_thresholds: BandThresholds::default(),
            count_timeout_verdicts: false,
            commitment: CommitmentConfig::default(),
            ruleset_version: "tw-ruleset/1".into(),
            max_in_flight: 128,
        }
    }
}

impl VerifierConfig {
    /// Reject configurations the pipeline cannot honor
    pub fn validate(&self) -> VerifyResult<()> {
        if self.min_validators == 0 {
            return Err(VerifyError::InvalidInput("min_validators must be >= 1".into()));
        }
        if self.band_thresholds.reject >= self.band_thresholds.flag {
            return Err(VerifyError::InvalidInput(
                "band_thresholds.reject must be below band_thresholds.flag".into(),
            ));
        }
        if self.commitment.nonce_bytes != NONCE_SIZE {
            return Err(VerifyError::InvalidInput(format!(
                "nonce_bytes is fixed at {} by the ruleset",
                NONCE_SIZE
            )));
        }
        self.commitment.algorithm()?;
        if self.global_deadline_ms < self.pool_deadline_ms {
            return Err(VerifyError::InvalidInput(
                "global deadline must cover the pool deadline".into(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(VerifyError::InvalidInput("max_in_flight must be >= 1".into()));
        }
        let w = &self.trust_weights;
        for (name, value) in [
            ("hallucination", w.hallucination),
            ("consensus", w.consensus),
            ("explanation", w.explanation),
            ("history", w.history),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VerifyError::InvalidInput(format!(
                    "trust weight {} out of [0, 1]",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
