//! Stake-proportional reward computer.

use crate::domain::{split_budget, RewardConfig};
use crate::ports::RewardComputer;
use shared_types::{ConsensusResult, MinerId, RewardInstruction, RewardReason, Task, TaskStatus};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ProportionalRewards {
    config: RewardConfig,
}

impl ProportionalRewards {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }
}

impl RewardComputer for ProportionalRewards {
    fn compute(
        &self,
        result: &ConsensusResult,
        task: &Task,
        stakes: &HashMap<MinerId, u128>,
    ) -> Vec<RewardInstruction> {
        if !result.quorum_reached || task.status != TaskStatus::Resolved {
            return Vec::new();
        }

        let shares: Vec<(MinerId, u128)> = result
            .agreeing_miners
            .iter()
            .map(|id| (id.clone(), stakes.get(id).copied().unwrap_or(0)))
            .collect();

        let instructions: Vec<RewardInstruction> = split_budget(self.config.budget, &shares)
            .into_iter()
            .map(|(miner_id, amount)| RewardInstruction {
                miner_id,
                task_id: task.id,
                amount,
                reason: RewardReason::ConsensusAgreement,
            })
            .collect();

        debug!(
            task_id = %task.id,
            recipients = instructions.len(),
            budget = %self.config.budget,
            "[rq-05] Rewards computed"
        );
        instructions
    }
}
