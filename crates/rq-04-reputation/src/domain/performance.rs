//! Exponential moving average of per-miner round scores.

use parking_lot::RwLock;
use shared_types::MinerId;
use std::collections::BTreeMap;

/// `ema = (1 - alpha) * ema + alpha * round_score`, starting from zero.
#[derive(Debug)]
pub struct PerformanceTracker {
    alpha: f64,
    averages: RwLock<BTreeMap<MinerId, f64>>,
}

impl PerformanceTracker {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(f64::MIN_POSITIVE, 1.0),
            averages: RwLock::new(BTreeMap::new()),
        }
    }

    /// Fold one round score into the miner's average. Returns the new average.
    pub fn record(&self, miner_id: &MinerId, round_score: f64) -> f64 {
        let score = if round_score.is_finite() {
            round_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut averages = self.averages.write();
        let ema = averages.entry(miner_id.clone()).or_insert(0.0);
        *ema = (1.0 - self.alpha) * *ema + self.alpha * score;
        *ema
    }

    pub fn get(&self, miner_id: &MinerId) -> Option<f64> {
        self.averages.read().get(miner_id).copied()
    }

    /// Current averages ordered by miner id.
    pub fn snapshot(&self) -> BTreeMap<MinerId, f64> {
        self.averages.read().clone()
    }

    /// Forget miners that left the population.
    pub fn forget(&self, miner_id: &MinerId) {
        self.averages.write().remove(miner_id);
    }
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new(0.05)
    }
}
