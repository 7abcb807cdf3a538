// verifier/src/context.rs

use crate::history::ModelHistory;
use crate::metrics::VerifierMetrics;
use crate::orchestrator::Verifier;
use cache::AdmissionTable;
use commitment::{CommitmentSink, Sealer};
use consensus::{PoolDeadlines, Validator, ValidatorPool};
use detection::{Detector, DetectorRule, FactSource};
use explainability::Explainer;
use introspection::ExtractionRuleset;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use trust_core::{VerifierConfig, VerifyResult};
use trust_crypto::{Clock, EntropySource, HashAlgorithm, OsEntropy, SystemClock};

/// Process-wide verification context: configuration, the cache (the only
/// shared mutable state), and every injected capability. Created once at
/// init and shared by reference.
pub struct CoreContext {
    pub(crate) config: VerifierConfig,
    pub(crate) algorithm: HashAlgorithm,
    pub(crate) admission: AdmissionTable,
    pub(crate) ruleset: ExtractionRuleset,
    pub(crate) detector: Detector,
    pub(crate) pool: ValidatorPool,
    pub(crate) explainers: Vec<Arc<dyn Explainer>>,
    pub(crate) sealer: Sealer,
    pub(crate) sink: Option<Arc<dyn CommitmentSink>>,
    pub(crate) facts: Option<Arc<dyn FactSource>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) permits: Arc<Semaphore>,
    pub(crate) history: ModelHistory,
    pub(crate) metrics: VerifierMetrics,
    pub(crate) validator_set: String,
}

impl CoreContext {
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub(crate) fn pool_deadlines(&self) -> PoolDeadlines {
        PoolDeadlines {
            per_validator: Duration::from_millis(self.config.per_validator_deadline_ms),
            pool: Duration::from_millis(self.config.pool_deadline_ms),
        }
    }
}

/// Assembles a `Verifier` from the configuration and the injected
/// collaborators. Validators and explainers are registered up front; the
/// resulting validator set id becomes part of every fingerprint.
pub struct VerifierBuilder {
    config: VerifierConfig,
    validators: Vec<Arc<dyn Validator>>,
    explainers: Vec<Arc<dyn Explainer>>,
    rules: Option<Vec<Box<dyn DetectorRule>>>,
    sink: Option<Arc<dyn CommitmentSink>>,
    facts: Option<Arc<dyn FactSource>>,
    clock: Option<Arc<dyn Clock>>,
    entropy: Option<Arc<dyn EntropySource>>,
}

impl VerifierBuilder {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            validators: Vec::new(),
            explainers: Vec::new(),
            rules: None,
            sink: None,
            facts: None,
            clock: None,
            entropy: None,
        }
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn validators(mut self, validators: Vec<Arc<dyn Validator>>) -> Self {
        self.validators.extend(validators);
        self
    }

    pub fn explainer(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainers.push(explainer);
        self
    }

    /// Replace the default detector ruleset
    pub fn detector_rules(mut self, rules: Vec<Box<dyn DetectorRule>>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn CommitmentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn fact_source(mut self, facts: Arc<dyn FactSource>) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Override the wall clock (tests)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the nonce entropy (tests)
    pub fn entropy(mut self, entropy: Arc<dyn EntropySource>) -> Self {
        self.entropy = Some(entropy);
        self
    }

    pub fn build(self) -> VerifyResult<Verifier> {
        self.config.validate()?;
        let algorithm = self.config.commitment.algorithm()?;

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let entropy: Arc<dyn EntropySource> =
            self.entropy.unwrap_or_else(|| Arc::new(OsEntropy::new()));
        let sealer = Sealer::new(&self.config.commitment, clock.clone(), entropy)?;

        let pool = ValidatorPool::new(self.validators);
        let validator_set = pool.set_id();
        let detector = match self.rules {
            Some(rules) => Detector::new(rules),
            None => Detector::with_default_rules(),
        };

        let admission = AdmissionTable::new(
            self.config.cache_capacity,
            Duration::from_secs(self.config.cache_ttl_s),
        );
        let permits = Arc::new(Semaphore::new(self.config.max_in_flight));

        tracing::info!(
            validators = pool.len(),
            explainers = self.explainers.len(),
            ruleset = %self.config.ruleset_version,
            "verifier initialized"
        );

        Ok(Verifier::from_context(CoreContext {
            config: self.config,
            algorithm,
            admission,
            ruleset: ExtractionRuleset::new(),
            detector,
            pool,
            explainers: self.explainers,
            sealer,
            sink: self.sink,
            facts: self.facts,
            clock,
            permits,
            history: ModelHistory::new(),
            metrics: VerifierMetrics::new(),
            validator_set,
        }))
    }
}
