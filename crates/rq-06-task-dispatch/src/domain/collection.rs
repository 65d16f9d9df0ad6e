//! Per-task collection state.
//!
//! Tracks which miners a task was dispatched to, which of them are still
//! outstanding, which answered, and which went silent. All methods are
//! synchronous; the service wraps one `Collection` per task in a mutex.

use crate::domain::{OrchestratorError, OrchestratorResult, ResponseAck};
use shared_types::{
    ConsensusResult, DispatchRequest, Fingerprint, MinerId, ResponseRecord, RewardInstruction,
    Task, TaskStatus, TransitionError,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct Collection {
    task: Task,
    responses: Vec<ResponseRecord>,
    /// Miner → issue time of its open request.
    outstanding: BTreeMap<MinerId, u64>,
    /// Every miner selected in any attempt.
    selected: BTreeSet<MinerId>,
    /// Miners that never answered, across all attempts.
    silent: BTreeSet<MinerId>,
    /// Miners that never answered in the current attempt.
    attempt_silent: BTreeSet<MinerId>,
    next_seq: u64,
    consensus: Option<ConsensusResult>,
    rewards: Vec<RewardInstruction>,
}

impl Collection {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            responses: Vec::new(),
            outstanding: BTreeMap::new(),
            selected: BTreeSet::new(),
            silent: BTreeSet::new(),
            attempt_silent: BTreeSet::new(),
            next_seq: 0,
            consensus: None,
            rewards: Vec::new(),
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    pub fn consensus(&self) -> Option<&ConsensusResult> {
        self.consensus.as_ref()
    }

    pub fn rewards(&self) -> &[RewardInstruction] {
        &self.rewards
    }

    pub fn selected(&self) -> &BTreeSet<MinerId> {
        &self.selected
    }

    pub fn pending(&self) -> Vec<MinerId> {
        self.outstanding.keys().cloned().collect()
    }

    pub fn non_responders(&self) -> Vec<MinerId> {
        self.silent.iter().cloned().collect()
    }

    pub fn attempt_non_responders(&self) -> usize {
        self.attempt_silent.len()
    }

    /// Open a dispatch attempt for `miners`: enter `Dispatched`, move the
    /// deadline, and build one request per miner.
    pub fn begin_attempt(
        &mut self,
        miners: &[MinerId],
        now: u64,
        deadline: u64,
    ) -> Result<Vec<DispatchRequest>, TransitionError> {
        if self.task.status == TaskStatus::TimedOut {
            self.task.attempt += 1;
        }
        self.task.transition(TaskStatus::Dispatched)?;
        self.task.deadline = deadline;
        self.attempt_silent.clear();

        let requests = miners
            .iter()
            .map(|miner_id| {
                self.selected.insert(miner_id.clone());
                self.outstanding.insert(miner_id.clone(), now);
                DispatchRequest::for_task(&self.task, miner_id.clone(), now)
            })
            .collect();
        Ok(requests)
    }

    /// Record one miner's answer.
    ///
    /// Duplicates are rejected, answers from miners the task never went to
    /// are rejected, and answers to closed requests are ignored.
    pub fn record(
        &mut self,
        miner_id: &MinerId,
        fingerprint: Fingerprint,
        artifact_ref: String,
        now: u64,
    ) -> OrchestratorResult<ResponseAck> {
        let task_id = self.task.id;
        if self.responses.iter().any(|r| &r.miner_id == miner_id) {
            return Err(OrchestratorError::DuplicateResponse {
                task_id,
                miner_id: miner_id.clone(),
            });
        }
        if !self.selected.contains(miner_id) {
            return Err(OrchestratorError::NotDispatched {
                task_id,
                miner_id: miner_id.clone(),
            });
        }
        if !self.task.status.accepts_responses() {
            return Ok(ResponseAck::Ignored);
        }
        let Some(issued_at) = self.outstanding.remove(miner_id) else {
            return Ok(ResponseAck::Ignored);
        };

        self.responses.push(ResponseRecord {
            task_id,
            miner_id: miner_id.clone(),
            fingerprint,
            artifact_ref,
            received_at: now,
            latency_ms: now.saturating_sub(issued_at),
            arrival_seq: self.next_seq,
        });
        self.next_seq += 1;

        if self.task.status == TaskStatus::Dispatched {
            // Dispatched -> AwaitingQuorum is always allowed.
            let _ = self.task.transition(TaskStatus::AwaitingQuorum);
        }
        Ok(ResponseAck::Accepted)
    }

    /// A request could not be delivered; the miner counts as silent.
    pub fn mark_unreachable(&mut self, miner_id: &MinerId) -> bool {
        if self.outstanding.remove(miner_id).is_none() {
            return false;
        }
        self.silent.insert(miner_id.clone());
        self.attempt_silent.insert(miner_id.clone());
        true
    }

    /// Deadline reached: every open request becomes a non-response.
    pub fn expire_outstanding(&mut self) -> Vec<MinerId> {
        let expired: Vec<MinerId> = std::mem::take(&mut self.outstanding).into_keys().collect();
        self.silent.extend(expired.iter().cloned());
        self.attempt_silent.extend(expired.iter().cloned());
        expired
    }

    /// Close open requests without blaming anyone (verdict already locked).
    pub fn cancel_outstanding(&mut self) -> Vec<MinerId> {
        std::mem::take(&mut self.outstanding).into_keys().collect()
    }

    pub fn transition(&mut self, next: TaskStatus) -> Result<(), TransitionError> {
        self.task.transition(next)
    }

    /// Enter the final `status` (if not already there) and store the verdict.
    pub fn conclude(
        &mut self,
        status: TaskStatus,
        consensus: Option<ConsensusResult>,
    ) -> Result<(), TransitionError> {
        if self.task.status != status {
            self.task.transition(status)?;
        }
        self.consensus = consensus;
        Ok(())
    }

    pub fn set_rewards(&mut self, rewards: Vec<RewardInstruction>) {
        self.rewards = rewards;
    }
}
