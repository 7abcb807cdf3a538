// trust-crypto/src/clock.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock capability used for commitment timestamps.
///
/// Isolated behind a trait so sealing is deterministic in tests.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds, non-decreasing within a process
    fn now_unix(&self) -> u64;
}

/// System wall clock with a non-decreasing guard.
///
/// Stores the max observed timestamp so a backwards wall-clock step
/// cannot produce a commitment older than its predecessor.
#[derive(Debug, Default)]
pub struct SystemClock {
    max_observed: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            max_observed: AtomicU64::new(0),
        }
    }
}

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.max_observed.fetch_max(wall, Ordering::SeqCst);
        self.max_observed.load(Ordering::SeqCst)
    }
}

/// Fixed clock for tests; advances only when told to
#[derive(Debug)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
