//! Reputation scorer writing through the miner registry.

use crate::domain::{classify_outcomes, PerformanceTracker, ScoreAdjustment, ScoringConfig};
use crate::ports::ReputationScorer;
use rq_01_miner_registry::MinerRegistryApi;
use shared_types::{ConsensusResult, MinerId, Task};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RegistryScorer {
    registry: Arc<dyn MinerRegistryApi>,
    config: ScoringConfig,
    tracker: Arc<PerformanceTracker>,
}

impl RegistryScorer {
    pub fn new(registry: Arc<dyn MinerRegistryApi>, config: ScoringConfig) -> Self {
        let tracker = Arc::new(PerformanceTracker::new(config.ema_alpha));
        Self {
            registry,
            config,
            tracker,
        }
    }

    /// Share an externally owned tracker (the runtime reads it for weights).
    pub fn with_tracker(mut self, tracker: Arc<PerformanceTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn tracker(&self) -> Arc<PerformanceTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}

impl ReputationScorer for RegistryScorer {
    fn apply(
        &self,
        result: &ConsensusResult,
        task: &Task,
        non_responders: &[MinerId],
    ) -> Vec<ScoreAdjustment> {
        let adjustments = classify_outcomes(result, non_responders, &self.config);
        let mut applied = Vec::with_capacity(adjustments.len());

        for adjustment in adjustments {
            match self.registry.apply_delta(
                &adjustment.miner_id,
                adjustment.delta,
                adjustment.outcome.is_failure(),
            ) {
                Ok(record) => {
                    self.tracker
                        .record(&adjustment.miner_id, adjustment.outcome.round_score());
                    debug!(
                        task_id = %task.id,
                        miner_id = %adjustment.miner_id,
                        outcome = ?adjustment.outcome,
                        score = record.reputation_score,
                        "[rq-04] Reputation adjusted"
                    );
                    applied.push(adjustment);
                }
                Err(e) => {
                    warn!(
                        task_id = %task.id,
                        miner_id = %adjustment.miner_id,
                        "[rq-04] Skipping reputation update: {}",
                        e
                    );
                }
            }
        }
        applied
    }
}
