use thiserror::Error;

/// Reputation deltas applied per finalized task.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub reward_delta: f64,
    pub divergence_penalty: f64,
    pub timeout_penalty: f64,
    /// Smoothing factor of the performance moving average.
    pub ema_alpha: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reward_delta: 0.02,
            divergence_penalty: 0.10,
            timeout_penalty: 0.05,
            ema_alpha: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("ema_alpha must lie in (0, 1], got {0}")]
    AlphaOutOfRange(f64),
}

impl ScoringConfig {
    /// Penalties must actually penalize; a zero penalty would let bad
    /// miners keep their standing forever.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for (field, value) in [
            ("reward_delta", self.reward_delta),
            ("divergence_penalty", self.divergence_penalty),
            ("timeout_penalty", self.timeout_penalty),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ScoringConfigError::NotPositive { field, value });
            }
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(ScoringConfigError::AlphaOutOfRange(self.ema_alpha));
        }
        Ok(())
    }
}
