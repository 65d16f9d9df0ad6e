use shared_types::{MinerId, OperationKind};
use std::collections::BTreeSet;

/// Selection policy
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Base seed mixed into every selection.
    pub seed: u64,
    /// Added to the normalized reputation so zero-score miners keep a
    /// non-zero weight.
    pub reputation_floor: f64,
    /// Miners scoring below this are never selected.
    pub min_reputation: f64,
    /// Miners whose failure streak exceeds this are never selected.
    pub failure_threshold: u32,
    /// Maximum outstanding dispatch requests per miner.
    pub concurrency_cap: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            reputation_floor: 0.05,
            min_reputation: 0.05,
            failure_threshold: 3,
            concurrency_cap: 4,
        }
    }
}

/// What to select miners for.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub operation: OperationKind,
    pub repository_ref: String,
    pub payload_ref: String,
    /// Number of miners wanted.
    pub count: u32,
    pub attempt: u32,
    /// Miners that must not be chosen (e.g. already used by an earlier attempt).
    pub exclude: BTreeSet<MinerId>,
}

impl SelectionRequest {
    pub fn new(
        operation: OperationKind,
        repository_ref: impl Into<String>,
        payload_ref: impl Into<String>,
        count: u32,
    ) -> Self {
        Self {
            operation,
            repository_ref: repository_ref.into(),
            payload_ref: payload_ref.into(),
            count,
            attempt: 0,
            exclude: BTreeSet::new(),
        }
    }

    /// Fewest eligible miners with which a majority of `count` is reachable.
    pub fn required_miners(&self) -> usize {
        (self.count as usize / 2 + 1).max(1)
    }
}
