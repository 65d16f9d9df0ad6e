mod archive;
mod collection;
mod config;
mod error;
mod report;

pub use archive::*;
pub use collection::*;
pub use config::*;
pub use error::*;
pub use report::*;
