use super::LedgerEntry;
use crate::domain::{LedgerError, LedgerResult, WeightVector};
use crate::ports::IncentiveLedger;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::RewardInstruction;
use std::sync::atomic::{AtomicBool, Ordering};

/// Ledger that keeps every submission in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: RwLock<Vec<LedgerEntry>>,
    offline: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following submission fail with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.read().clone()
    }

    /// All reward instructions received so far, in arrival order.
    pub fn rewards(&self) -> Vec<RewardInstruction> {
        self.entries
            .read()
            .iter()
            .filter_map(|entry| match entry {
                LedgerEntry::Rewards { instructions } => Some(instructions.clone()),
                LedgerEntry::Weights(_) => None,
            })
            .flatten()
            .collect()
    }

    pub fn weights(&self) -> Vec<WeightVector> {
        self.entries
            .read()
            .iter()
            .filter_map(|entry| match entry {
                LedgerEntry::Weights(w) => Some(w.clone()),
                LedgerEntry::Rewards { .. } => None,
            })
            .collect()
    }

    fn push(&self, entry: LedgerEntry) -> LedgerResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("ledger is offline".into()));
        }
        self.entries.write().push(entry);
        Ok(())
    }
}

#[async_trait]
impl IncentiveLedger for InMemoryLedger {
    async fn emit_rewards(&self, instructions: Vec<RewardInstruction>) -> LedgerResult<()> {
        self.push(LedgerEntry::Rewards { instructions })
    }

    async fn submit_weights(&self, weights: WeightVector) -> LedgerResult<()> {
        self.push(LedgerEntry::Weights(weights))
    }
}
