/// Reward policy
#[derive(Debug, Clone)]
pub struct RewardConfig {
    /// Token units shared by the agreeing miners of one resolved task.
    pub budget: u128,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self { budget: 1_000_000 }
    }
}
