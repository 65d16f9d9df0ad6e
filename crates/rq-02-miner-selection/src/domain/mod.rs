//! Domain layer for miner selection

mod config;
mod error;
mod sampler;
mod slots;

pub use config::*;
pub use error::*;
pub use sampler::*;
pub use slots::*;
