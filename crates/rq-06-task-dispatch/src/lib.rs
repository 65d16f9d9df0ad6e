//! # rq-06-task-dispatch
//!
//! Task dispatch, response collection and the orchestrator service.
//!
//! ## Lifecycle
//!
//! ```text
//! Pending ──► Dispatched ──► AwaitingQuorum ──► Resolved
//!    │            │                │        ├──► Failed(NoQuorum)
//!    │            │                │        └──► TimedOut ──(retry)──► Dispatched
//!    └──► Failed(InsufficientMiners)
//! ```
//!
//! A task enters `Dispatched` as soon as its miners are selected, before
//! the requests go out, so a fast miner can never answer a task that does
//! not accept responses yet.
//!
//! ## Outcomes
//!
//! - **Resolved**: the canonical group holds a strict majority of the
//!   redundancy factor. Early if no pending response could change that.
//! - **Failed(NoQuorum)**: every dispatched miner answered, no majority.
//! - **TimedOut**: miners stayed silent. Their requests are replaced by
//!   fresh miners while the retry budget lasts; each retry gets a new
//!   deadline and never reuses a miner from an earlier attempt.
//! - **Failed(InsufficientMiners)**: the first selection could not find
//!   enough eligible miners for a majority.
//!
//! Responses for closed requests are acknowledged as `Ignored`. Duplicates
//! and responses from miners the task never went to are rejected.
//!
//! Finalized tasks move to a bounded `TaskArchive`; anything older is read
//! back from the `TaskHistory`.

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{ChannelTransport, InMemoryTaskHistory, JsonlTaskHistory, OutboundMessage};
pub use domain::{
    ArchivedTask, Collection, DispatchConfig, OrchestratorError, OrchestratorResult, ResponseAck,
    TaskArchive, TaskReport, TaskStatusView,
};
pub use ports::{HistoryError, MinerTransport, OrchestratorApi, TaskHistory, TransportError};
pub use service::{Orchestrator, OrchestratorDependencies};
