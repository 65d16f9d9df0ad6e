mod config;
mod outcome;
mod performance;

pub use config::*;
pub use outcome::*;
pub use performance::*;
