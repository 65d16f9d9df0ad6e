//! Adapters for the transport and history ports

mod channel_transport;
mod history;

pub use channel_transport::*;
pub use history::*;
