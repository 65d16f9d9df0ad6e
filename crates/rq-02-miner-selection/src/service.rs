//! Weighted miner selector backed by the registry and the dispatch slots.

use crate::domain::{
    derive_seed, selection_weight, weighted_sample, Candidate, DispatchSlots, SelectionConfig,
    SelectionError, SelectionRequest, SelectionResult, SlotTable,
};
use crate::ports::MinerSelector;
use rq_01_miner_registry::MinerRegistryApi;
use shared_types::{MinerId, MinerRecord};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stake- and reputation-weighted selector
pub struct WeightedSelector {
    registry: Arc<dyn MinerRegistryApi>,
    slots: Arc<DispatchSlots>,
    config: SelectionConfig,
}

impl WeightedSelector {
    pub fn new(registry: Arc<dyn MinerRegistryApi>, config: SelectionConfig) -> Self {
        let slots = Arc::new(DispatchSlots::new(config.concurrency_cap));
        Self {
            registry,
            slots,
            config,
        }
    }

    /// Shared view of the per-miner outstanding request counts.
    pub fn slots(&self) -> Arc<DispatchSlots> {
        Arc::clone(&self.slots)
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    fn is_eligible(&self, record: &MinerRecord, request: &SelectionRequest, table: &SlotTable) -> bool {
        record.available
            && record.consecutive_failures <= self.config.failure_threshold
            && record.reputation_score >= self.config.min_reputation
            && !request.exclude.contains(&record.miner_id)
            && table.has_capacity(&record.miner_id)
    }

    fn candidates(&self, request: &SelectionRequest, table: &SlotTable) -> Vec<Candidate> {
        let max_score = self.registry.max_score();
        self.registry
            .list_available()
            .into_iter()
            .filter(|record| self.is_eligible(record, request, table))
            .map(|record| Candidate {
                weight: selection_weight(
                    record.reputation_score,
                    max_score,
                    record.stake_weight,
                    self.config.reputation_floor,
                ),
                miner_id: record.miner_id,
            })
            .collect()
    }
}

impl MinerSelector for WeightedSelector {
    fn select(&self, request: &SelectionRequest) -> SelectionResult<Vec<MinerId>> {
        if request.count == 0 {
            return Err(SelectionError::InvalidRedundancy);
        }

        let seed = derive_seed(self.config.seed, request);
        let required = request.required_miners();

        self.slots.transact(|table| {
            let candidates = self.candidates(request, table);
            if candidates.len() < required {
                warn!(
                    operation = %request.operation,
                    eligible = candidates.len(),
                    required,
                    "[rq-02] Not enough eligible miners"
                );
                return Err(SelectionError::InsufficientMiners {
                    available: candidates.len(),
                    required,
                });
            }

            let chosen = weighted_sample(candidates, request.count as usize, seed);
            for miner_id in &chosen {
                // Candidates were filtered on capacity under this same lock.
                let _ = table.acquire(miner_id);
            }

            debug!(
                operation = %request.operation,
                attempt = request.attempt,
                selected = chosen.len(),
                "[rq-02] Miners selected"
            );
            Ok(chosen)
        })
    }

    fn release(&self, miner_id: &MinerId) {
        self.slots.release(miner_id);
    }
}
