//! Record-level rules: score clamping, failure streaks, population sync.

use super::RegistryConfig;
use serde::{Deserialize, Serialize};
use shared_types::{MinerId, MinerRecord};

/// Apply one reputation delta to a record in place.
///
/// The new score is `clamp(old + delta, 0, max_score)`. A failure extends the
/// consecutive-failure streak and benches the miner once the streak exceeds
/// `failure_threshold`; a success resets the streak.
pub fn apply_score_delta(
    record: &mut MinerRecord,
    delta: f64,
    failure: bool,
    config: &RegistryConfig,
) {
    let delta = if delta.is_finite() { delta } else { 0.0 };
    record.reputation_score = config.clamp_score(record.reputation_score + delta);

    if failure {
        record.consecutive_failures = record.consecutive_failures.saturating_add(1);
        if record.consecutive_failures > config.failure_threshold {
            record.available = false;
        }
    } else {
        record.consecutive_failures = 0;
    }
}

/// One miner as reported by an external population sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub miner_id: MinerId,
    pub stake_weight: u128,
    /// Whether the miner currently advertises a reachable endpoint.
    pub serving: bool,
}

/// Outcome of `MinerRegistry::sync_population`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: Vec<MinerId>,
    pub updated: usize,
    /// Known miners absent from the sync; now unavailable.
    pub departed: Vec<MinerId>,
}

/// Merge a sync entry into an existing record, keeping its reputation.
///
/// A miner that stops serving becomes unavailable. Serving again only
/// restores availability if the failure streak has not benched it.
pub fn merge_population_entry(
    record: &mut MinerRecord,
    entry: &PopulationEntry,
    config: &RegistryConfig,
) {
    record.stake_weight = entry.stake_weight;
    record.available = entry.serving && record.consecutive_failures <= config.failure_threshold;
}
