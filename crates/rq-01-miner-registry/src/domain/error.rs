//! Error types for the miner registry

use crate::ports::StoreError;
use shared_types::MinerId;

/// Registry error types
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Miner not found: {0}")]
    NotFound(MinerId),

    #[error("Miner already registered: {0}")]
    AlreadyRegistered(MinerId),

    #[error("Registry persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
