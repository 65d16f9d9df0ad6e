//! Driven ports (Outbound dependencies)

use shared_types::MinerRecord;
use std::path::PathBuf;

/// Persistence failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Corrupt registry file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Registry already in use ({0})")]
    Locked(PathBuf),
}

/// Durable storage for registry state; reputation must survive restarts.
pub trait RegistryStore: Send + Sync {
    /// Load every persisted record (empty when nothing was stored yet)
    fn load(&self) -> Result<Vec<MinerRecord>, StoreError>;

    /// Replace the persisted state with `records`
    fn save(&self, records: &[MinerRecord]) -> Result<(), StoreError>;
}
