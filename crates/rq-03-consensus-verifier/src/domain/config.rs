/// Verifier policy
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Settle a verdict before every response is in once the outcome is
    /// locked. When off, verdicts only settle when nothing is pending.
    pub early_resolution: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            early_resolution: true,
        }
    }
}
