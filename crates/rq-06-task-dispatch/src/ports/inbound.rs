//! Driving ports (Inbound API)

use crate::domain::{OrchestratorResult, ResponseAck, TaskReport, TaskStatusView};
use async_trait::async_trait;
use shared_types::{Fingerprint, MinerId, MinerRecord, OperationKind, Task, TaskId};

/// Orchestrator API
///
/// Entry point for the request gateway (task submission, status) and the
/// transport layer (miner responses).
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// Accept a new task and start dispatching it in the background.
    ///
    /// Fails with `InvalidTask` for an empty payload or repository reference
    /// or a zero redundancy factor; nothing is dispatched in that case.
    async fn submit(
        &self,
        operation: OperationKind,
        repository_ref: String,
        payload_ref: String,
        redundancy_factor: u32,
    ) -> OrchestratorResult<Task>;

    /// Current status, plus the canonical fingerprint and artifact once resolved.
    async fn get_status(&self, task_id: TaskId) -> OrchestratorResult<TaskStatusView>;

    /// Ingest one miner's answer. The miner id is the identity attributed by
    /// the transport layer.
    async fn submit_response(
        &self,
        task_id: TaskId,
        miner_id: MinerId,
        fingerprint: Fingerprint,
        artifact_ref: String,
    ) -> OrchestratorResult<ResponseAck>;

    /// Suspend until the task is final and return its report.
    async fn await_result(&self, task_id: TaskId) -> OrchestratorResult<TaskReport>;

    /// Read-only dump of every miner record, ordered by miner id.
    async fn registry_snapshot(&self) -> Vec<MinerRecord>;
}
