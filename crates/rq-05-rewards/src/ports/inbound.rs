//! Driving ports (Inbound API)

use shared_types::{ConsensusResult, MinerId, RewardInstruction, Task};
use std::collections::HashMap;

/// Turns a finalized verdict into payment instructions.
pub trait RewardComputer: Send + Sync {
    /// One instruction per agreeing miner of a resolved task; nothing
    /// otherwise. `stakes` holds the stake weight of each agreeing miner.
    fn compute(
        &self,
        result: &ConsensusResult,
        task: &Task,
        stakes: &HashMap<MinerId, u128>,
    ) -> Vec<RewardInstruction>;
}
