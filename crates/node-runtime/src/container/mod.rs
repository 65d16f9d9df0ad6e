//! # Subsystem Container
//!
//! Central container holding all subsystem instances with proper
//! lifetime management and dependency injection.
//!
//! - Subsystems initialized in dependency order (registry first)
//! - Subsystems talk to each other only through their ports
//! - File-backed adapters live under the configured data directory

pub mod config;
pub mod subsystems;

pub use config::{load_config, ConfigError, HousekeepingConfig, NodeConfig, StorageConfig};
pub use subsystems::SubsystemContainer;
