//! Driven ports (Outbound dependencies)

use crate::domain::{LedgerResult, WeightVector};
use async_trait::async_trait;
use shared_types::RewardInstruction;

/// External incentive ledger.
///
/// Emission is fire-and-forget from the orchestrator's point of view:
/// failures are logged, never retried by the core.
#[async_trait]
pub trait IncentiveLedger: Send + Sync {
    /// Hand over the reward instructions of one resolved task.
    async fn emit_rewards(&self, instructions: Vec<RewardInstruction>) -> LedgerResult<()>;

    /// Publish the current normalized performance weights.
    async fn submit_weights(&self, weights: WeightVector) -> LedgerResult<()>;
}
