//! Driving ports (Inbound API)

use crate::domain::ScoreAdjustment;
use shared_types::{ConsensusResult, MinerId, Task};

/// Reputation update strategy, invoked once per finalized task.
pub trait ReputationScorer: Send + Sync {
    /// Apply score changes for everyone involved in `task`.
    ///
    /// `non_responders` are miners that never answered before their
    /// deadline (including unreachable ones). Returns the adjustments that
    /// were applied; unknown miners are skipped.
    fn apply(
        &self,
        result: &ConsensusResult,
        task: &Task,
        non_responders: &[MinerId],
    ) -> Vec<ScoreAdjustment>;
}
