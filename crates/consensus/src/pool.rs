// consensus/src/pool.rs

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use trust_core::{validator_set_id, Request, Response, ValidatorVerdict, VerdictStatus};

/// An independent quality validator.
///
/// Validators report their own `passed`/`confidence`/`issues`; the pool
/// owns `validator_id`, `elapsed_us`, and `status`, so a validator cannot
/// spoof another's identity or forge a timeout.
#[async_trait]
pub trait Validator: Send + Sync {
    fn id(&self) -> &str;

    async fn validate(&self, request: &Request, response: &Response) -> ValidatorVerdict;
}

/// Per-validator and whole-pool deadlines
#[derive(Debug, Clone, Copy)]
pub struct PoolDeadlines {
    pub per_validator: Duration,
    pub pool: Duration,
}

impl Default for PoolDeadlines {
    fn default() -> Self {
        Self {
            per_validator: Duration::from_millis(250),
            pool: Duration::from_millis(500),
        }
    }
}

/// Runs registered validators concurrently and collects their verdicts
/// in a deterministic order.
pub struct ValidatorPool {
    validators: Vec<Arc<dyn Validator>>,
}

impl ValidatorPool {
    /// Build a pool, dropping duplicate validator ids (first one wins)
    pub fn new(validators: Vec<Arc<dyn Validator>>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(validators.len());
        for validator in validators {
            if seen.insert(validator.id().to_string()) {
                unique.push(validator);
            } else {
                tracing::warn!(
                    validator = validator.id(),
                    "duplicate validator id dropped; one validator, one vote"
                );
            }
        }
        Self { validators: unique }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn validator_ids(&self) -> Vec<String> {
        self.validators.iter().map(|v| v.id().to_string()).collect()
    }

    /// Stable identifier of this validator set for fingerprinting
    pub fn set_id(&self) -> String {
        validator_set_id(&self.validator_ids())
    }

    /// Run every validator in parallel. Each task races its own deadline
    /// and the cancellation token; the pool deadline bounds collection.
    /// Verdicts come back sorted by validator id so aggregation is
    /// invariant to scheduling.
    pub async fn run(
        &self,
        request: &Arc<Request>,
        response: &Arc<Response>,
        deadlines: PoolDeadlines,
        cancel: &CancellationToken,
    ) -> Vec<ValidatorVerdict> {
        let pool_deadline = Instant::now() + deadlines.pool;

        let handles: Vec<(String, tokio::task::JoinHandle<ValidatorVerdict>)> = self
            .validators
            .iter()
            .map(|validator| {
                let validator = validator.clone();
                let request = request.clone();
                let response = response.clone();
                let cancel = cancel.clone();
                let per_deadline = deadlines.per_validator;
                let id = validator.id().to_string();

                let handle = tokio::spawn(async move {
                    let started = Instant::now();
                    let outcome = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        result = tokio::time::timeout(
                            per_deadline,
                            validator.validate(&request, &response),
                        ) => Some(result),
                    };
                    let elapsed_us = started.elapsed().as_micros() as u64;

                    match outcome {
                        Some(Ok(mut verdict)) => {
                            verdict.validator_id = validator.id().to_string();
                            verdict.confidence = verdict.confidence.clamp(0.0, 1.0);
                            verdict.elapsed_us = elapsed_us;
                            verdict.status = VerdictStatus::Ok;
                            verdict
                        }
                        Some(Err(_)) => ValidatorVerdict::failed(
                            validator.id(),
                            VerdictStatus::Timeout,
                            elapsed_us,
                        ),
                        None => ValidatorVerdict::failed(
                            validator.id(),
                            VerdictStatus::Error("cancelled".into()),
                            elapsed_us,
                        ),
                    }
                });
                (id, handle)
            })
            .collect();

        let collectors = handles.into_iter().map(|(id, handle)| async move {
            match tokio::time::timeout_at(pool_deadline, handle).await {
                Ok(Ok(verdict)) => verdict,
                Ok(Err(join_error)) => {
                    tracing::warn!(validator = %id, error = %join_error, "validator panicked");
                    ValidatorVerdict::failed(&id, VerdictStatus::Error("internal".into()), 0)
                }
                Err(_) => ValidatorVerdict::failed(&id, VerdictStatus::Timeout, 0),
            }
        });

        let mut verdicts = join_all(collectors).await;
        verdicts.sort_by(|a, b| a.validator_id.cmp(&b.validator_id));
        verdicts
    }
}
