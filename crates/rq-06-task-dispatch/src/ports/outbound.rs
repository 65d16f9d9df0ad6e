//! Driven ports (Outbound dependencies)

use crate::domain::TaskReport;
use async_trait::async_trait;
use shared_types::{DispatchRequest, MinerId, TaskId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("miner {0} is unreachable")]
    Unreachable(MinerId),

    #[error("transport closed")]
    Closed,
}

/// Delivery of requests to miners.
///
/// Responses come back through `OrchestratorApi::submit_response`.
#[async_trait]
pub trait MinerTransport: Send + Sync {
    /// Deliver one request. An error means the miner never got it.
    async fn dispatch(&self, request: DispatchRequest) -> Result<(), TransportError>;

    /// Tell a miner its request is no longer needed. Advisory only.
    async fn cancel(&self, task_id: TaskId, miner_id: &MinerId) -> Result<(), TransportError>;
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history record corrupt at line {line}: {message}")]
    Corrupt { line: usize, message: String },

    #[error("history encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only audit log of finished tasks.
#[async_trait]
pub trait TaskHistory: Send + Sync {
    async fn append(&self, report: &TaskReport) -> Result<(), HistoryError>;

    /// Every record, oldest first.
    async fn load_all(&self) -> Result<Vec<TaskReport>, HistoryError>;

    /// Latest record for `task_id`.
    async fn find(&self, task_id: TaskId) -> Result<Option<TaskReport>, HistoryError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .rev()
            .find(|report| report.task.id == task_id))
    }
}
