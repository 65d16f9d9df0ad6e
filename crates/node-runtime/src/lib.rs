//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! - `container/` - configuration and subsystem wiring
//! - `wiring/` - housekeeping loops and population bootstrap

pub mod container;
pub mod wiring;

pub use container::{load_config, ConfigError, NodeConfig, SubsystemContainer};
