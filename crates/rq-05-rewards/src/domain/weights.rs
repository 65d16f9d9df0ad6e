//! Normalized weight vectors submitted to the incentive ledger.

use serde::{Deserialize, Serialize};
use shared_types::MinerId;
use std::collections::BTreeMap;

/// L1-normalized per-miner weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub weights: BTreeMap<MinerId, f64>,
    /// Unix milliseconds.
    pub issued_at: u64,
}

impl WeightVector {
    /// Normalize raw scores so they sum to one.
    ///
    /// Negative and non-finite scores count as zero. When nothing positive
    /// remains every weight is zero.
    pub fn normalize(scores: &BTreeMap<MinerId, f64>, issued_at: u64) -> Self {
        let sanitized: BTreeMap<MinerId, f64> = scores
            .iter()
            .map(|(id, score)| {
                let score = if score.is_finite() && *score > 0.0 { *score } else { 0.0 };
                (id.clone(), score)
            })
            .collect();

        let sum: f64 = sanitized.values().sum();
        let weights = if sum > 0.0 && sum.is_finite() {
            sanitized
                .into_iter()
                .map(|(id, score)| (id, score / sum))
                .collect()
        } else {
            sanitized.into_keys().map(|id| (id, 0.0)).collect()
        };

        Self { weights, issued_at }
    }

    pub fn is_zero(&self) -> bool {
        self.weights.values().all(|w| *w == 0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
