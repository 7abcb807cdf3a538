// verifier/src/history.rs

use std::collections::HashMap;
use std::sync::Mutex;

/// EMA smoothing factor, roughly a 100-verification window
const ALPHA: f64 = 0.02;

/// Per-model rolling success rate feeding the trust score's history term.
///
/// A verification counts as a success when its band is not Reject. Models
/// without history contribute the neutral 0.5 via the composer default.
#[derive(Debug, Default)]
pub struct ModelHistory {
    rates: Mutex<HashMap<String, f64>>,
}

impl ModelHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_rate(&self, model_id: &str) -> Option<f64> {
        self.rates.lock().unwrap().get(model_id).copied()
    }

    /// Fold one outcome into the model's exponential moving average
    pub fn record(&self, model_id: &str, success: bool) {
        let outcome = if success { 1.0 } else { 0.0 };
        let mut rates = self.rates.lock().unwrap();
        match rates.get_mut(model_id) {
            Some(rate) => *rate = *rate * (1.0 - ALPHA) + outcome * ALPHA,
            None => {
                // Seed from neutral so one verification cannot dominate
                rates.insert(model_id.to_string(), 0.5 * (1.0 - ALPHA) + outcome * ALPHA);
            }
        }
    }
}
