/// Reputation bounds and benching policy.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound of `reputation_score` (lower bound is 0).
    pub max_score: f64,
    /// Score given to newly registered miners.
    pub initial_score: f64,
    /// A miner is marked unavailable once its consecutive failures exceed this.
    pub failure_threshold: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_score: 1.0,
            initial_score: 0.5,
            failure_threshold: 3,
        }
    }
}

impl RegistryConfig {
    /// Clamp a score into `[0, max_score]`; NaN collapses to 0.
    pub fn clamp_score(&self, score: f64) -> f64 {
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, self.max_score)
    }
}
