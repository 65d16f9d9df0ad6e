//! Ledger adapters

mod jsonl_ledger;
mod memory_ledger;

pub use jsonl_ledger::*;
pub use memory_ledger::*;

use crate::domain::WeightVector;
use serde::{Deserialize, Serialize};
use shared_types::RewardInstruction;

/// One submission as seen by a ledger adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntry {
    Rewards { instructions: Vec<RewardInstruction> },
    Weights(WeightVector),
}
