//! # rq-02-miner-selection
//!
//! Chooses which miners a task is dispatched to.
//!
//! ## Algorithm
//!
//! Weighted sampling without replacement over the eligible miners
//! (Efraimidis–Spirakis keys). A miner's weight grows with both its
//! reputation and its stake. Randomness comes from a `StdRng` seeded by
//! hashing the configured seed with the task's operation, repository,
//! payload and attempt number, so the same request against the same
//! registry snapshot always yields the same ordered miner list.
//!
//! ## Eligibility
//!
//! A miner is eligible when it is available, its failure streak is within
//! the threshold, its reputation is at least `min_reputation`, it was not
//! explicitly excluded, and it has spare dispatch capacity.
//!
//! ## Concurrency cap
//!
//! `DispatchSlots` counts outstanding dispatch requests per miner. Selection
//! and slot reservation happen under one lock, so two tasks selecting at the
//! same time can never push a miner past the cap.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    derive_seed, selection_weight, weighted_sample, Candidate, DispatchSlots, SelectionConfig,
    SelectionError, SelectionRequest, SelectionResult,
};
pub use ports::MinerSelector;
pub use service::WeightedSelector;
