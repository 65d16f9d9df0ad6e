//! Driving ports (Inbound API)

use shared_types::{ConsensusResult, MinerId, ResponseRecord, TaskId};
use std::collections::HashMap;

/// Everything the verifier needs to judge one task at one instant.
#[derive(Debug, Clone)]
pub struct VerificationInput<'a> {
    pub task_id: TaskId,
    pub redundancy_factor: u32,
    /// Every accepted response of the task, across all attempts.
    pub responses: &'a [ResponseRecord],
    /// Stake weight of every responder and pending miner.
    pub stakes: &'a HashMap<MinerId, u128>,
    /// Miners whose requests are still outstanding.
    pub pending: &'a [MinerId],
    /// Unix milliseconds, stamped into the result.
    pub now: u64,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub result: ConsensusResult,
    /// No pending response can change `result` any more.
    pub settled: bool,
}

/// Strategy that judges a task's responses.
pub trait ConsensusVerifier: Send + Sync {
    /// Evaluate the responses received so far.
    ///
    /// Called after every new response and once more at the deadline.
    fn evaluate(&self, input: &VerificationInput<'_>) -> Verdict;
}
