// verifier/src/orchestrator.rs

use crate::compose::compose;
use crate::context::{CoreContext, VerifierBuilder};
use crate::state::PipelineState;
use async_trait::async_trait;
use cache::{AdmissionTable, AdmitOutcome, CacheStats, VerificationSlot};
use commitment::{submit_with_retry, CommitmentMetadata};
use consensus::aggregate;
use explainability::{run_explainers, DEFAULT_TOP_K};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use trust_core::{
    request_fingerprint, response_digest, HallucinationEvidence, RecordDraft, Request, Response,
    SinkStatus, TimeoutScope, TrustBand, ValidatorVerdict, VerificationRecord, VerifierConfig,
    VerifyError, VerifyResult,
};
use trust_crypto::Digest;
use unicode_normalization::UnicodeNormalization;

/// Produces the response under verification. Invoked only on a cache
/// miss, after fingerprinting, so duplicate requests never pay for
/// inference.
#[async_trait]
pub trait ResponseProducer: Send + Sync {
    async fn produce(&self, request: &Request) -> VerifyResult<Response>;
}

/// Stage results the orchestrator keeps for the partial-verdict path on
/// a global timeout
#[derive(Default)]
struct Partial {
    response_digest: Option<Digest>,
    evidence: Option<Vec<HallucinationEvidence>>,
    verdicts: Option<Vec<ValidatorVerdict>>,
}

/// The verification pipeline entry point
pub struct Verifier {
    ctx: Arc<CoreContext>,
}

impl Verifier {
    pub fn builder(config: VerifierConfig) -> VerifierBuilder {
        VerifierBuilder::new(config)
    }

    pub(crate) fn from_context(ctx: CoreContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.ctx.config
    }

    /// Fingerprint a request under the active ruleset and validator set
    pub fn fingerprint(&self, request: &Request) -> Digest {
        request_fingerprint(
            request,
            &self.ctx.config.ruleset_version,
            &self.ctx.validator_set,
            self.ctx.algorithm,
        )
    }

    /// Cache probe without admission
    pub fn lookup(&self, fingerprint: &Digest) -> Option<Arc<VerificationRecord>> {
        self.ctx.admission.lookup(fingerprint)
    }

    /// Seed the cache with an externally produced record
    pub fn warm_cache(&self, fingerprint: Digest, record: Arc<VerificationRecord>) {
        self.ctx.admission.warm(fingerprint, record);
    }

    pub fn metrics(&self) -> crate::metrics::MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.ctx.admission.cache_stats()
    }

    /// Verify one request. Returns the sealed record, or a single
    /// structured error; no partial records escape.
    pub async fn verify(
        &self,
        request: Request,
        producer: &dyn ResponseProducer,
    ) -> VerifyResult<Arc<VerificationRecord>> {
        self.ctx.metrics.record_started();
        validate_request(&request)?;

        let fingerprint = self.fingerprint(&request);
        tracing::debug!(request_id = %request.id, fingerprint = %fingerprint, state = %PipelineState::Admitted, "verification admitted");

        match self.ctx.admission.admit(fingerprint) {
            AdmitOutcome::Hit(record) => {
                self.ctx.metrics.record_cache_hit();
                Ok(record)
            }
            AdmitOutcome::Join(rx) => {
                self.ctx.metrics.record_joined();
                AdmissionTable::join(rx).await
            }
            AdmitOutcome::Fresh(slot) => {
                self.verify_fresh(request, fingerprint, producer, slot).await
            }
        }
    }

    async fn verify_fresh(
        &self,
        request: Request,
        fingerprint: Digest,
        producer: &dyn ResponseProducer,
        slot: VerificationSlot,
    ) -> VerifyResult<Arc<VerificationRecord>> {
        let permit = match self.ctx.permits.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.ctx.metrics.record_backpressure();
                slot.abort(VerifyError::Backpressure);
                return Err(VerifyError::Backpressure);
            }
        };

        let started = Instant::now();
        let cancel = CancellationToken::new();
        let partial = Arc::new(Mutex::new(Partial::default()));
        let request = Arc::new(request);

        let global_deadline = Duration::from_millis(self.ctx.config.global_deadline_ms);
        let outcome = tokio::time::timeout(
            global_deadline,
            self.run_pipeline(&request, fingerprint, producer, &cancel, &partial),
        )
        .await;
        drop(permit);

        match outcome {
            Ok(Ok(record)) => {
                let band = record.trust.band;
                self.finish(&request, record.clone(), started, slot);
                tracing::info!(
                    request_id = %request.id,
                    band = band.name(),
                    state = %terminal_state(band),
                    "verification complete"
                );
                Ok(record)
            }
            Ok(Err(error)) => {
                self.ctx.metrics.record_failed();
                tracing::warn!(request_id = %request.id, %error, state = %PipelineState::Failed, "verification failed");
                slot.abort(error.clone());
                Err(error)
            }
            Err(_) => {
                cancel.cancel();
                self.ctx.metrics.record_global_timeout();

                // Enough partial results may already determine a rejection
                if let Some(record) = self.salvage(&request, fingerprint, &partial) {
                    tracing::warn!(
                        request_id = %request.id,
                        state = %PipelineState::Rejected,
                        "global deadline hit; partial results reject the response"
                    );
                    self.finish(&request, record.clone(), started, slot);
                    return Ok(record);
                }

                self.ctx.metrics.record_failed();
                let error = VerifyError::Timeout {
                    scope: TimeoutScope::Global,
                };
                tracing::warn!(request_id = %request.id, state = %PipelineState::Failed, "global deadline exceeded");
                slot.abort(error.clone());
                Err(error)
            }
        }
    }

    async fn run_pipeline(
        &self,
        request: &Arc<Request>,
        fingerprint: Digest,
        producer: &dyn ResponseProducer,
        cancel: &CancellationToken,
        partial: &Arc<Mutex<Partial>>,
    ) -> VerifyResult<Arc<VerificationRecord>> {
        let ctx = &self.ctx;

        let mut response = producer.produce(request).await?;
        response.text = response.text.nfc().collect();
        validate_response(&response)?;
        let response = Arc::new(response);

        let digest = response_digest(&response, ctx.algorithm);
        partial.lock().unwrap().response_digest = Some(digest);

        tracing::debug!(request_id = %request.id, state = %PipelineState::Introspecting, "extracting claims");
        let claims = ctx.ruleset.extract(&response);

        // Fan out: detection, validators, and explainers run concurrently
        tracing::debug!(
            request_id = %request.id,
            claims = claims.len(),
            states = %format!(
                "{} | {} | {}",
                PipelineState::DetectingEvidence,
                PipelineState::RunningValidators,
                PipelineState::ExplainingOptional
            ),
            validators = ctx.pool.len(),
            explainers = ctx.explainers.len(),
            "fanning out verification subtasks"
        );
        let detect_task = {
            let ctx = self.ctx.clone();
            let request = request.clone();
            let response = response.clone();
            let claims = claims.clone();
            let partial = partial.clone();
            tokio::task::spawn_blocking(move || {
                let result =
                    ctx.detector
                        .detect(&request, &response, &claims, ctx.facts.as_deref());
                if let Ok(evidence) = &result {
                    partial.lock().unwrap().evidence = Some(evidence.clone());
                }
                result
            })
        };
        let pool_task = async {
            let verdicts = ctx
                .pool
                .run(request, &response, ctx.pool_deadlines(), cancel)
                .await;
            partial.lock().unwrap().verdicts = Some(verdicts.clone());
            verdicts
        };
        let explain_task = run_explainers(&ctx.explainers, request, &response, cancel);

        let (detect_outcome, verdicts, explainer_outputs) =
            tokio::join!(detect_task, pool_task, explain_task);
        let evidence = detect_outcome
            .map_err(|e| VerifyError::Internal(format!("detector task failed: {}", e)))??;

        tracing::debug!(request_id = %request.id, state = %PipelineState::Aggregating, "aggregating verdicts");
        let consensus = aggregate(
            &verdicts,
            ctx.config.min_validators,
            ctx.config.count_timeout_verdicts,
        );
        let explanation = explainability::aggregate(&explainer_outputs, DEFAULT_TOP_K);

        tracing::debug!(request_id = %request.id, state = %PipelineState::Composing, "composing trust score");
        let trust = compose(
            &evidence,
            &consensus,
            explanation.as_ref(),
            ctx.history.success_rate(&request.model_id),
            &ctx.config.trust_weights,
            &ctx.config.band_thresholds,
        );

        let draft = RecordDraft {
            request_id: request.id,
            fingerprint,
            response_digest: digest,
            hallucinations: evidence,
            validators: verdicts,
            consensus,
            explanation,
            trust,
            created_at: ctx.clock.now_unix(),
        };

        tracing::debug!(request_id = %request.id, state = %PipelineState::Sealing, "sealing commitment");
        let mut commitment = ctx.sealer.seal(&draft);
        if let Some(sink) = &ctx.sink {
            let metadata = CommitmentMetadata {
                request_id: draft.request_id,
                fingerprint,
                band: draft.trust.band,
                timestamp: commitment.timestamp,
            };
            match submit_with_retry(sink.as_ref(), commitment.record_hash, metadata, cancel).await
            {
                Some(receipt) => commitment.sink_status = SinkStatus::Accepted(receipt),
                None => {
                    tracing::warn!(
                        request_id = %request.id,
                        "commitment sink unavailable; record is local-only"
                    );
                }
            }
        }

        Ok(Arc::new(draft.into_record(commitment)))
    }

    /// After a global timeout: if the collected verdicts and evidence
    /// already determine a rejection, seal and return that record instead
    /// of failing. The sink is skipped; the record stays local-only.
    fn salvage(
        &self,
        request: &Arc<Request>,
        fingerprint: Digest,
        partial: &Arc<Mutex<Partial>>,
    ) -> Option<Arc<VerificationRecord>> {
        let ctx = &self.ctx;
        let partial = partial.lock().unwrap();
        let evidence = partial.evidence.clone()?;
        let verdicts = partial.verdicts.clone()?;
        let digest = partial.response_digest?;

        let consensus = aggregate(
            &verdicts,
            ctx.config.min_validators,
            ctx.config.count_timeout_verdicts,
        );
        let trust = compose(
            &evidence,
            &consensus,
            None,
            ctx.history.success_rate(&request.model_id),
            &ctx.config.trust_weights,
            &ctx.config.band_thresholds,
        );
        if trust.band != TrustBand::Reject {
            return None;
        }

        let draft = RecordDraft {
            request_id: request.id,
            fingerprint,
            response_digest: digest,
            hallucinations: evidence,
            validators: verdicts,
            consensus,
            explanation: None,
            trust,
            created_at: ctx.clock.now_unix(),
        };
        let commitment = ctx.sealer.seal(&draft);
        Some(Arc::new(draft.into_record(commitment)))
    }

    fn finish(
        &self,
        request: &Arc<Request>,
        record: Arc<VerificationRecord>,
        started: Instant,
        slot: VerificationSlot,
    ) {
        let band = record.trust.band;
        self.ctx
            .metrics
            .record_completed(band, started.elapsed().as_micros() as u64);
        self.ctx
            .history
            .record(&request.model_id, band != TrustBand::Reject);
        slot.commit(record);
    }
}

fn validate_request(request: &Request) -> VerifyResult<()> {
    if request.model_id.is_empty() {
        return Err(VerifyError::InvalidInput("model_id is empty".into()));
    }
    if request.prompt.is_empty() {
        return Err(VerifyError::InvalidInput("prompt is empty".into()));
    }
    Ok(())
}

fn validate_response(response: &Response) -> VerifyResult<()> {
    let len = response.text.len();
    if response.token_spans.iter().any(|s| s.end > len || s.start > s.end) {
        return Err(VerifyError::InvalidInput(
            "malformed token span in response".into(),
        ));
    }
    Ok(())
}

fn terminal_state(band: TrustBand) -> PipelineState {
    if band == TrustBand::Reject {
        PipelineState::Rejected
    } else {
        PipelineState::Done
    }
}
