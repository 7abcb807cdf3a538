// consensus/src/lib.rs

//! Quality consensus: validator pool and verdict aggregation
//!
//! This crate implements the multi-validator stage:
//! - Validators run in parallel under per-validator and pool deadlines
//! - Timeouts, errors, and panics become verdicts, never pipeline failures
//! - Verdicts aggregate with confidence-weighted voting plus a quorum rule
//! - Duplicate validator ids are rejected and validators never observe
//!   each other's verdicts

pub mod aggregate;
pub mod pool;

pub use aggregate::aggregate;
pub use pool::{PoolDeadlines, Validator, ValidatorPool};

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_imports() {
        // Smoke test
    }
}
