//! # rq-05-rewards
//!
//! Reward computation and the hand-off to the external incentive ledger.
//!
//! Each resolved task carries a fixed reward budget, split across the
//! miners of the canonical group in proportion to their stake. Amounts are
//! integer token units; the flooring remainder goes to the agreeing miner
//! with the largest stake (ties by miner id), so the instructions of a task
//! always sum to exactly the budget.
//!
//! Besides per-task rewards, the runtime periodically submits a normalized
//! weight vector built from the miners' performance averages.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryLedger, JsonlLedger, LedgerEntry};
pub use domain::{split_budget, LedgerError, LedgerResult, RewardConfig, WeightVector};
pub use ports::{IncentiveLedger, RewardComputer};
pub use service::ProportionalRewards;
