//! # Runtime Wiring
//!
//! Long-running tasks that connect the orchestrator to the outside world:
//!
//! - `housekeeping` - periodic weight emission and the outbound message drain
//! - `population` - startup sync of the miner population from a file

pub mod housekeeping;
pub mod population;

pub use housekeeping::{drain_outbound, emit_weights_once, run_weight_emitter};
pub use population::{load_population, sync_population_file};
