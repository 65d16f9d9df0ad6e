//! Error types for miner selection

/// Selection error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Insufficient miners: {available} eligible, {required} required for quorum")]
    InsufficientMiners { available: usize, required: usize },

    #[error("Redundancy factor must be at least 1")]
    InvalidRedundancy,
}

/// Result type for selection operations
pub type SelectionResult<T> = Result<T, SelectionError>;
