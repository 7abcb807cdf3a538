// verifier/src/metrics.rs

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use trust_core::TrustBand;

/// Verifier-wide counters. All mutation goes through `CoreContext`.
#[derive(Debug, Default)]
pub struct VerifierMetrics {
    started: AtomicU64,
    completed: AtomicU64,
    cache_hits: AtomicU64,
    joined: AtomicU64,
    backpressure: AtomicU64,
    global_timeouts: AtomicU64,
    failed: AtomicU64,
    accepted: AtomicU64,
    flagged: AtomicU64,
    rejected: AtomicU64,
    total_latency_us: AtomicU64,
}

impl VerifierMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_joined(&self) {
        self.joined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backpressure(&self) {
        self.backpressure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_global_timeout(&self) {
        self.global_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self, band: TrustBand, latency_us: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        match band {
            TrustBand::Accept => self.accepted.fetch_add(1, Ordering::Relaxed),
            TrustBand::Flag => self.flagged.fetch_add(1, Ordering::Relaxed),
            TrustBand::Reject => self.rejected.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let completed = self.completed.load(Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);
        MetricsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            completed,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            joined: self.joined.load(Ordering::Relaxed),
            backpressure: self.backpressure.load(Ordering::Relaxed),
            global_timeouts: self.global_timeouts.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            flagged: self.flagged.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            avg_latency_us: if completed > 0 {
                total_latency_us as f64 / completed as f64
            } else {
                0.0
            },
        }
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub started: u64,
    pub completed: u64,
    pub cache_hits: u64,
    pub joined: u64,
    pub backpressure: u64,
    pub global_timeouts: u64,
    pub failed: u64,
    pub accepted: u64,
    pub flagged: u64,
    pub rejected: u64,
    pub avg_latency_us: f64,
}
