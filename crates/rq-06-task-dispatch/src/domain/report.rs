//! Views of task state handed to callers and to the history log.

use serde::{Deserialize, Serialize};
use shared_types::{ConsensusResult, Fingerprint, RewardInstruction, Task, TaskId, TaskStatus};

/// Outcome of `submit_response` for a response that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseAck {
    /// Recorded and fed to the verifier.
    Accepted,
    /// Arrived after the task (or this miner's request) was closed.
    Ignored,
}

/// Answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusView {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub canonical_fingerprint: Option<Fingerprint>,
    pub artifact_ref: Option<String>,
}

/// Everything known about a finished task. Also the history log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub task: Task,
    /// `None` only when the task never got dispatched.
    pub consensus: Option<ConsensusResult>,
    pub rewards: Vec<RewardInstruction>,
}

impl TaskReport {
    pub fn status_view(&self) -> TaskStatusView {
        let resolved = self.task.status == TaskStatus::Resolved;
        let consensus = self.consensus.as_ref().filter(|_| resolved);
        TaskStatusView {
            task_id: self.task.id,
            status: self.task.status,
            canonical_fingerprint: consensus.and_then(|c| c.canonical_fingerprint.clone()),
            artifact_ref: consensus.and_then(|c| c.canonical_artifact.clone()),
        }
    }
}
