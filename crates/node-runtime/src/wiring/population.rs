//! Miner population bootstrap.
//!
//! The population file is a JSON array of
//! `{"miner_id": "...", "stake_weight": 123, "serving": true}` entries.

use std::path::Path;

use anyhow::{Context, Result};
use rq_01_miner_registry::{MinerRegistry, PopulationEntry, SyncReport};
use tracing::info;

/// Read a population file.
pub fn load_population(path: &Path) -> Result<Vec<PopulationEntry>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading population file {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing population file {}", path.display()))
}

/// Reconcile the registry with the population file at `path`.
pub fn sync_population_file(registry: &MinerRegistry, path: &Path) -> Result<SyncReport> {
    let entries = load_population(path)?;
    info!(
        entries = entries.len(),
        "[rq-01] Syncing population from {}",
        path.display()
    );
    Ok(registry.sync_population(entries))
}
