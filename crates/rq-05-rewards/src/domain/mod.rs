mod config;
mod error;
mod split;
mod weights;

pub use config::*;
pub use error::*;
pub use split::*;
pub use weights::*;
