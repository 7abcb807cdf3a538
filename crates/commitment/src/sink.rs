// commitment/src/sink.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trust_core::{SinkReceipt, TrustBand};
use trust_crypto::Digest;
use uuid::Uuid;

/// Base delay of the submission backoff
pub const BACKOFF_BASE: Duration = Duration::from_millis(50);
/// Backoff ceiling
pub const BACKOFF_MAX: Duration = Duration::from_secs(1);
/// Submission attempts before giving up
pub const MAX_SUBMIT_TRIES: u32 = 5;

/// Auxiliary data submitted alongside the record hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentMetadata {
    pub request_id: Uuid,
    pub fingerprint: Digest,
    pub band: TrustBand,
    pub timestamp: u64,
}

/// Errors a sink may return
#[derive(Debug, Clone, thiserror::Error)]
pub enum SinkError {
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    #[error("Sink rejected commitment: {0}")]
    Rejected(String),
}

/// External on-chain verifier boundary. The core only pushes opaque
/// hashes plus metadata; ratification happens out of process.
#[async_trait]
pub trait CommitmentSink: Send + Sync {
    async fn submit(
        &self,
        record_hash: Digest,
        metadata: CommitmentMetadata,
    ) -> Result<SinkReceipt, SinkError>;
}

/// Submit with exponential backoff (50 ms base, 1 s cap, 5 tries).
///
/// Returns `None` when retries are exhausted or the token fires; the
/// caller degrades the record to local-only instead of failing.
pub async fn submit_with_retry(
    sink: &dyn CommitmentSink,
    record_hash: Digest,
    metadata: CommitmentMetadata,
    cancel: &CancellationToken,
) -> Option<SinkReceipt> {
    let mut delay = BACKOFF_BASE;

    for attempt in 1..=MAX_SUBMIT_TRIES {
        if cancel.is_cancelled() {
            return None;
        }

        match sink.submit(record_hash, metadata.clone()).await {
            Ok(receipt) => return Some(receipt),
            Err(error) => {
                tracing::warn!(
                    attempt,
                    max = MAX_SUBMIT_TRIES,
                    %error,
                    "commitment sink submission failed"
                );
            }
        }

        if attempt < MAX_SUBMIT_TRIES {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = (delay * 2).min(BACKOFF_MAX);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakySink {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl CommitmentSink for FlakySink {
        async fn submit(
            &self,
            _: Digest,
            _: CommitmentMetadata,
        ) -> Result<SinkReceipt, SinkError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(SinkError::Unavailable("connection refused".into()))
            } else {
                Ok(SinkReceipt {
                    receipt_id: format!("rcpt-{}", call),
                })
            }
        }
    }

    fn metadata() -> CommitmentMetadata {
        CommitmentMetadata {
            request_id: Uuid::nil(),
            fingerprint: Digest::zero(),
            band: TrustBand::Accept,
            timestamp: 1_700_000_000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_retries() {
        let sink = FlakySink {
            failures_before_success: 2,
            calls: AtomicU32::new(0),
        };
        let receipt = submit_with_retry(
            &sink,
            Digest::zero(),
            metadata(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(receipt.unwrap().receipt_id, "rcpt-2");
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries() {
        let sink = FlakySink {
            failures_before_success: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let receipt = submit_with_retry(
            &sink,
            Digest::zero(),
            metadata(),
            &CancellationToken::new(),
        )
        .await;

        assert!(receipt.is_none());
        assert_eq!(sink.calls.load(Ordering::SeqCst), MAX_SUBMIT_TRIES);
    }

    #[tokio::test]
    async fn test_cancellation_stops_retrying() {
        let sink = FlakySink {
            failures_before_success: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let receipt = submit_with_retry(&sink, Digest::zero(), metadata(), &cancel).await;
        assert!(receipt.is_none());
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }
}
