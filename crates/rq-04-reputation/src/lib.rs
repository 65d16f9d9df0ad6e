//! # rq-04-reputation
//!
//! Adjusts miner reputation from finalized consensus results.
//!
//! | Outcome                  | Score delta          | Failure streak |
//! |--------------------------|----------------------|----------------|
//! | in the canonical group   | `+reward_delta`      | reset          |
//! | divergent                | `-divergence_penalty`| +1             |
//! | no response by deadline  | `-timeout_penalty`   | +1             |
//!
//! Deltas apply whether or not the task reached quorum: without quorum the
//! canonical group is still the heaviest one, and everyone outside it
//! diverged. Scores are clamped by the registry, so they stay inside
//! `[0, max_score]`.
//!
//! The crate also keeps an exponential moving average of round scores per
//! miner (`PerformanceTracker`), which feeds the periodic weight vector.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    classify_outcomes, MinerOutcome, PerformanceTracker, ScoreAdjustment, ScoringConfig,
    ScoringConfigError,
};
pub use ports::ReputationScorer;
pub use service::RegistryScorer;
