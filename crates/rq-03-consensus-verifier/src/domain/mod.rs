//! Domain layer for consensus verification

mod config;
mod tally;

pub use config::*;
pub use tally::*;
