//! # Core Domain Entities
//!
//! Defines the orchestrator entities exchanged between subsystems.
//!
//! ## Clusters
//!
//! - **Tasks**: `Task`, `TaskStatus`, `OperationKind`, `DispatchRequest`
//! - **Miners**: `MinerId`, `MinerRecord`
//! - **Verification**: `ResponseRecord`, `Fingerprint`, `ConsensusResult`
//! - **Incentives**: `RewardInstruction`, `RewardReason`

use crate::errors::{ParseOperationError, TransitionError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// Identity of a worker node, as attributed by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinerId(String);

impl MinerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MinerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MinerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random task id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content-derived identifier of a miner's claimed result.
///
/// Compared for equality only; the artifact itself never travels with it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: TASKS
// =============================================================================

/// The version-control operation a task asks miners to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Push,
    Pull,
    Clone,
    Merge,
    Branch,
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Push,
        OperationKind::Pull,
        OperationKind::Clone,
        OperationKind::Merge,
        OperationKind::Branch,
        OperationKind::Delete,
    ];

    /// Stable wire name (also fed into the selection seed).
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Push => "push",
            OperationKind::Pull => "pull",
            OperationKind::Clone => "clone",
            OperationKind::Merge => "merge",
            OperationKind::Branch => "branch",
            OperationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOperationError(s.to_string()))
    }
}

/// Why a task ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// Not enough eligible miners to ever reach quorum.
    InsufficientMiners,
    /// Every dispatched miner answered and no majority emerged.
    NoQuorum,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::InsufficientMiners => f.write_str("InsufficientMiners"),
            FailureReason::NoQuorum => f.write_str("NoQuorum"),
        }
    }
}

/// Task lifecycle state.
///
/// ```text
/// Pending ──► Dispatched ──► AwaitingQuorum ──► Resolved
///    │            │                │        ├──► Failed
///    │            │                │        └──► TimedOut ──(retry)──► Dispatched
///    └──► Failed  └──► Failed / TimedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Dispatched,
    AwaitingQuorum,
    Resolved,
    Failed(FailureReason),
    TimedOut,
}

impl TaskStatus {
    /// Whether `submit_response` may record responses in this state.
    pub fn accepts_responses(&self) -> bool {
        matches!(self, TaskStatus::Dispatched | TaskStatus::AwaitingQuorum)
    }

    /// Resolved, Failed and TimedOut end a dispatch attempt. Only TimedOut
    /// may be left again, and only by a retry.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Resolved | TaskStatus::Failed(_) | TaskStatus::TimedOut
        )
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::{AwaitingQuorum, Dispatched, Failed, Pending, Resolved, TimedOut};
        matches!(
            (self, next),
            (Pending, Dispatched)
                | (Pending, Failed(_))
                | (Dispatched, AwaitingQuorum)
                | (Dispatched, Failed(_))
                | (Dispatched, TimedOut)
                | (AwaitingQuorum, Resolved)
                | (AwaitingQuorum, Failed(_))
                | (AwaitingQuorum, TimedOut)
                | (TimedOut, Dispatched)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => f.write_str("Pending"),
            TaskStatus::Dispatched => f.write_str("Dispatched"),
            TaskStatus::AwaitingQuorum => f.write_str("AwaitingQuorum"),
            TaskStatus::Resolved => f.write_str("Resolved"),
            TaskStatus::Failed(reason) => write!(f, "Failed({reason})"),
            TaskStatus::TimedOut => f.write_str("TimedOut"),
        }
    }
}

/// One orchestrated version-control operation dispatched for redundant execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub repository_ref: String,
    pub operation: OperationKind,
    pub payload_ref: String,
    /// Number of miners the task is dispatched to (≥ 1).
    pub redundancy_factor: u32,
    /// Unix milliseconds.
    pub created_at: u64,
    /// Unix milliseconds; moves forward when a retry re-enters Dispatched.
    pub deadline: u64,
    pub status: TaskStatus,
    /// Dispatch attempt, starting at 0.
    pub attempt: u32,
}

impl Task {
    pub fn new(
        operation: OperationKind,
        repository_ref: impl Into<String>,
        payload_ref: impl Into<String>,
        redundancy_factor: u32,
        created_at: u64,
    ) -> Self {
        Self {
            id: TaskId::new(),
            repository_ref: repository_ref.into(),
            operation,
            payload_ref: payload_ref.into(),
            redundancy_factor,
            created_at,
            deadline: created_at,
            status: TaskStatus::Pending,
            attempt: 0,
        }
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, next: TaskStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Member count a fingerprint group needs for a strict majority.
    pub fn quorum_threshold(&self) -> usize {
        self.redundancy_factor as usize / 2 + 1
    }
}

/// One request to one miner; at most one outstanding per (task, miner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub task_id: TaskId,
    pub miner_id: MinerId,
    pub operation: OperationKind,
    pub repository_ref: String,
    pub payload_ref: String,
    pub attempt: u32,
    /// Unix milliseconds.
    pub issued_at: u64,
}

impl DispatchRequest {
    pub fn for_task(task: &Task, miner_id: MinerId, issued_at: u64) -> Self {
        Self {
            task_id: task.id,
            miner_id,
            operation: task.operation,
            repository_ref: task.repository_ref.clone(),
            payload_ref: task.payload_ref.clone(),
            attempt: task.attempt,
            issued_at,
        }
    }
}

// =============================================================================
// CLUSTER C: MINERS
// =============================================================================

/// Reputation, stake and availability state of one miner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerRecord {
    pub miner_id: MinerId,
    pub stake_weight: u128,
    /// Always within `[0, max_score]`.
    pub reputation_score: f64,
    pub consecutive_failures: u32,
    /// Unix milliseconds.
    pub last_seen_at: u64,
    pub available: bool,
}

impl MinerRecord {
    pub fn new(miner_id: MinerId, stake_weight: u128, reputation_score: f64) -> Self {
        Self {
            miner_id,
            stake_weight,
            reputation_score,
            consecutive_failures: 0,
            last_seen_at: 0,
            available: true,
        }
    }
}

// =============================================================================
// CLUSTER D: VERIFICATION
// =============================================================================

/// A miner's claimed result for a task. At most one per (task, miner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub task_id: TaskId,
    pub miner_id: MinerId,
    pub fingerprint: Fingerprint,
    pub artifact_ref: String,
    /// Unix milliseconds.
    pub received_at: u64,
    /// Time between issuing the request and receiving this response.
    pub latency_ms: u64,
    /// Per-task arrival order, starting at 0.
    pub arrival_seq: u64,
}

/// Verdict over all responses of a task. Computed once, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub task_id: TaskId,
    pub canonical_fingerprint: Option<Fingerprint>,
    /// Artifact reference of the earliest agreeing response.
    pub canonical_artifact: Option<String>,
    pub agreeing_miners: BTreeSet<MinerId>,
    /// Miners whose fingerprint differs from the canonical one.
    pub divergent_miners: BTreeSet<MinerId>,
    pub quorum_reached: bool,
    /// Unix milliseconds.
    pub resolved_at: u64,
}

impl ConsensusResult {
    /// A result with no responses at all.
    pub fn empty(task_id: TaskId, resolved_at: u64) -> Self {
        Self {
            task_id,
            canonical_fingerprint: None,
            canonical_artifact: None,
            agreeing_miners: BTreeSet::new(),
            divergent_miners: BTreeSet::new(),
            quorum_reached: false,
            resolved_at,
        }
    }
}

// =============================================================================
// CLUSTER E: INCENTIVES
// =============================================================================

/// Why a reward was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardReason {
    /// The miner belonged to the canonical group of a resolved task.
    ConsensusAgreement,
}

impl fmt::Display for RewardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardReason::ConsensusAgreement => f.write_str("consensus-agreement"),
        }
    }
}

/// Payment instruction handed to the external incentive ledger. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardInstruction {
    pub miner_id: MinerId,
    pub task_id: TaskId,
    pub amount: u128,
    pub reason: RewardReason,
}
