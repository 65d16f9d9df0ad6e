//! Orchestrator error types

use crate::ports::HistoryError;
use rq_01_miner_registry::RegistryError;
use rq_02_miner_selection::SelectionError;
use shared_types::{MinerId, TaskId, TransitionError};
use thiserror::Error;

/// Errors returned synchronously to orchestrator callers.
///
/// Per-task failures after submission never surface here; they end up in
/// the task's status.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("insufficient miners: {available} eligible, {required} required")]
    InsufficientMiners { available: usize, required: usize },

    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("miner {miner_id} already responded to task {task_id}")]
    DuplicateResponse { task_id: TaskId, miner_id: MinerId },

    #[error("miner {miner_id} was never dispatched task {task_id}")]
    NotDispatched { task_id: TaskId, miner_id: MinerId },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] TransitionError),

    #[error("orchestrator is shutting down")]
    ShuttingDown,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SelectionError> for OrchestratorError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::InsufficientMiners {
                available,
                required,
            } => OrchestratorError::InsufficientMiners {
                available,
                required,
            },
            SelectionError::InvalidRedundancy => {
                OrchestratorError::InvalidTask("redundancy factor must be at least 1".into())
            }
        }
    }
}

impl OrchestratorError {
    /// Short label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            OrchestratorError::InvalidTask(_) => "invalid_task",
            OrchestratorError::InsufficientMiners { .. } => "insufficient_miners",
            OrchestratorError::UnknownTask(_) => "unknown_task",
            OrchestratorError::DuplicateResponse { .. } => "duplicate_response",
            OrchestratorError::NotDispatched { .. } => "not_dispatched",
            OrchestratorError::Registry(_) => "registry",
            OrchestratorError::History(_) => "history",
            OrchestratorError::Lifecycle(_) => "lifecycle",
            OrchestratorError::ShuttingDown => "shutting_down",
            OrchestratorError::Internal(_) => "internal",
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
