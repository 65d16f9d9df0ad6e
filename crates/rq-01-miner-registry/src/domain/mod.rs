//! Domain layer for the miner registry

mod config;
mod error;
mod record;

pub use config::*;
pub use error::*;
pub use record::*;
