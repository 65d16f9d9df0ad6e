//! Bounded store of recently finished tasks.
//!
//! A finished task leaves the live task map and lands here, keeping just
//! enough to answer status queries and classify straggling responses.
//! Once evicted, a task is only known to the task history.

use crate::domain::{OrchestratorError, OrchestratorResult, ResponseAck, TaskReport};
use shared_types::{MinerId, TaskId};
use std::collections::{BTreeSet, HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct ArchivedTask {
    pub report: TaskReport,
    /// Every miner the task was dispatched to.
    pub selected: BTreeSet<MinerId>,
    /// Miners whose response was recorded.
    pub responded: BTreeSet<MinerId>,
}

impl ArchivedTask {
    /// Same verdicts a live task gives once it stopped accepting responses.
    pub fn classify_response(&self, miner_id: &MinerId) -> OrchestratorResult<ResponseAck> {
        let task_id = self.report.task.id;
        if self.responded.contains(miner_id) {
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
        Ok(ResponseAck::Ignored)
    }
}

/// FIFO of archived tasks, oldest evicted first.
#[derive(Debug)]
pub struct TaskArchive {
    capacity: usize,
    order: VecDeque<TaskId>,
    entries: HashMap<TaskId, ArchivedTask>,
}

impl TaskArchive {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, task_id: &TaskId) -> Option<&ArchivedTask> {
        self.entries.get(task_id)
    }

    /// Add a finished task, returning the id evicted to make room, if any.
    pub fn insert(&mut self, archived: ArchivedTask) -> Option<TaskId> {
        if self.capacity == 0 {
            return None;
        }
        let task_id = archived.report.task.id;
        if self.entries.insert(task_id, archived).is_some() {
            return None;
        }
        self.order.push_back(task_id);
        if self.order.len() <= self.capacity {
            return None;
        }
        let evicted = self.order.pop_front()?;
        self.entries.remove(&evicted);
        Some(evicted)
    }
}
