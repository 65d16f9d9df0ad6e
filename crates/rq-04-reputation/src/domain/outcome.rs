//! Per-miner outcome of one finalized task.

use crate::domain::ScoringConfig;
use shared_types::{ConsensusResult, MinerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerOutcome {
    Agreed,
    Diverged,
    TimedOut,
}

impl MinerOutcome {
    /// Round score fed into the performance moving average.
    pub fn round_score(&self) -> f64 {
        match self {
            MinerOutcome::Agreed => 1.0,
            MinerOutcome::Diverged | MinerOutcome::TimedOut => 0.0,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, MinerOutcome::Agreed)
    }
}

/// A reputation change to apply to one miner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAdjustment {
    pub miner_id: MinerId,
    pub outcome: MinerOutcome,
    pub delta: f64,
}

impl ScoreAdjustment {
    fn new(miner_id: MinerId, outcome: MinerOutcome, config: &ScoringConfig) -> Self {
        let delta = match outcome {
            MinerOutcome::Agreed => config.reward_delta,
            MinerOutcome::Diverged => -config.divergence_penalty,
            MinerOutcome::TimedOut => -config.timeout_penalty,
        };
        Self {
            miner_id,
            outcome,
            delta,
        }
    }
}

/// Derive the adjustments for one finalized task.
///
/// Miners that are both in the result and among `non_responders` are
/// treated by their response.
pub fn classify_outcomes(
    result: &ConsensusResult,
    non_responders: &[MinerId],
    config: &ScoringConfig,
) -> Vec<ScoreAdjustment> {
    let mut adjustments = Vec::new();

    adjustments.extend(
        result
            .agreeing_miners
            .iter()
            .map(|id| ScoreAdjustment::new(id.clone(), MinerOutcome::Agreed, config)),
    );
    adjustments.extend(
        result
            .divergent_miners
            .iter()
            .map(|id| ScoreAdjustment::new(id.clone(), MinerOutcome::Diverged, config)),
    );

    let mut silent: Vec<&MinerId> = non_responders
        .iter()
        .filter(|id| {
            !result.agreeing_miners.contains(*id) && !result.divergent_miners.contains(*id)
        })
        .collect();
    silent.sort();
    silent.dedup();
    adjustments.extend(
        silent
            .into_iter()
            .map(|id| ScoreAdjustment::new(id.clone(), MinerOutcome::TimedOut, config)),
    );

    adjustments
}
