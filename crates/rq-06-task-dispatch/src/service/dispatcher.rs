//! Task dispatcher: selection, request issuance, retries and finalization.

use super::{Core, TaskCell};
use crate::domain::{Collection, OrchestratorResult, TaskReport};
use crate::metrics;
use futures::future::join_all;
use rq_02_miner_selection::SelectionRequest;
use rq_03_consensus_verifier::Verdict;
use shared_types::{ConsensusResult, DispatchRequest, FailureReason, TaskStatus};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

/// What to do after an attempt's verdict is in.
enum Next {
    Retry(Vec<DispatchRequest>),
    Finish,
}

impl Core {
    /// Select miners for the next attempt of `collection`'s task and enter
    /// `Dispatched`. Miners used by earlier attempts are never reselected.
    pub(super) fn begin_attempt(
        &self,
        collection: &mut Collection,
        count: u32,
    ) -> OrchestratorResult<Vec<DispatchRequest>> {
        let task = collection.task();
        let mut request = SelectionRequest::new(
            task.operation,
            task.repository_ref.clone(),
            task.payload_ref.clone(),
            count,
        );
        request.attempt = match task.status {
            TaskStatus::TimedOut => task.attempt + 1,
            _ => task.attempt,
        };
        request.exclude = collection.selected().clone();

        let miners = self.selector.select(&request)?;
        let now = self.now();
        let deadline = now.saturating_add(self.config.task_timeout_ms());
        match collection.begin_attempt(&miners, now, deadline) {
            Ok(requests) => Ok(requests),
            Err(e) => {
                for miner_id in &miners {
                    self.selector.release(miner_id);
                }
                Err(e.into())
            }
        }
    }

    /// Run the task from its first dispatched attempt to a final status.
    pub(super) async fn drive(self: Arc<Self>, cell: Arc<TaskCell>, first: Vec<DispatchRequest>) {
        let mut requests = first;
        loop {
            let deadline = Instant::now() + self.config.task_timeout;
            self.send_requests(&cell, requests).await;
            let verdict = self.collect(&cell, deadline).await;
            match self.judge(&cell, verdict) {
                Next::Retry(next) => requests = next,
                Next::Finish => break,
            }
        }
        self.finalize(&cell).await;
    }

    /// Issue all requests of one attempt concurrently. Undeliverable
    /// requests count as non-responses.
    async fn send_requests(&self, cell: &TaskCell, requests: Vec<DispatchRequest>) {
        let sends = requests.into_iter().map(|request| {
            let transport = Arc::clone(&self.transport);
            async move {
                let miner_id = request.miner_id.clone();
                (miner_id, transport.dispatch(request).await)
            }
        });

        for (miner_id, outcome) in join_all(sends).await {
            if let Err(e) = outcome {
                let task_id = {
                    let mut collection = cell.collection.lock();
                    if !collection.mark_unreachable(&miner_id) {
                        continue;
                    }
                    collection.task().id
                };
                self.selector.release(&miner_id);
                warn!(
                    task_id = %task_id,
                    miner_id = %miner_id,
                    "[rq-06] Dispatch failed, counting as non-response: {}",
                    e
                );
            }
        }
        cell.wake.notify_one();
    }

    /// Turn an attempt's verdict into the next lifecycle step.
    fn judge(&self, cell: &TaskCell, verdict: Verdict) -> Next {
        let mut collection = cell.collection.lock();
        let task_id = collection.task().id;
        let result = verdict.result;

        if result.quorum_reached {
            return self.conclude(&mut collection, TaskStatus::Resolved, result);
        }
        if collection.attempt_non_responders() == 0 {
            let status = TaskStatus::Failed(FailureReason::NoQuorum);
            return self.conclude(&mut collection, status, result);
        }

        if let Err(e) = collection.transition(TaskStatus::TimedOut) {
            warn!(task_id = %task_id, "[rq-06] {}", e);
            return Next::Finish;
        }
        let attempt = collection.task().attempt;
        if attempt >= self.config.retry_budget {
            info!(task_id = %task_id, attempt, "[rq-06] Retry budget exhausted");
            return self.conclude(&mut collection, TaskStatus::TimedOut, result);
        }

        let replacements = collection.attempt_non_responders() as u32;
        match self.begin_attempt(&mut collection, replacements) {
            Ok(requests) => {
                info!(
                    task_id = %task_id,
                    attempt = attempt + 1,
                    replacements = requests.len(),
                    "[rq-06] Task timed out, retrying with replacement miners"
                );
                Next::Retry(requests)
            }
            Err(e) => {
                warn!(task_id = %task_id, "[rq-06] Retry not possible: {}", e);
                self.conclude(&mut collection, TaskStatus::TimedOut, result)
            }
        }
    }

    fn conclude(
        &self,
        collection: &mut Collection,
        status: TaskStatus,
        result: ConsensusResult,
    ) -> Next {
        if let Err(e) = collection.conclude(status, Some(result)) {
            warn!(task_id = %collection.task().id, "[rq-06] {}", e);
        }
        Next::Finish
    }

    /// Score, reward, record and publish a task that reached its final
    /// status, then archive it.
    pub(super) async fn finalize(&self, cell: &TaskCell) -> TaskReport {
        let (task, consensus, non_responders) = {
            let collection = cell.collection.lock();
            (
                collection.task().clone(),
                collection.consensus().cloned(),
                collection.non_responders(),
            )
        };

        let rewards = match &consensus {
            Some(result) => {
                self.scorer.apply(result, &task, &non_responders);
                let stakes = self.stakes(result.agreeing_miners.iter());
                self.rewards.compute(result, &task, &stakes)
            }
            None => Vec::new(),
        };
        cell.collection.lock().set_rewards(rewards.clone());

        if !rewards.is_empty() {
            if let Err(e) = self.ledger.emit_rewards(rewards.clone()).await {
                warn!(task_id = %task.id, "[rq-06] Reward emission failed: {}", e);
            }
        }

        let report = TaskReport {
            task,
            consensus,
            rewards,
        };
        if let Err(e) = self.history.append(&report).await {
            warn!(task_id = %report.task.id, "[rq-06] History append failed: {}", e);
        }
        if let Err(e) = self.flush_registry().await {
            warn!(task_id = %report.task.id, "[rq-06] Registry flush failed: {}", e);
        }

        let elapsed = cell.submitted.elapsed().as_secs_f64();
        metrics::record_task_finalized(&report.task.status.to_string(), elapsed);
        info!(
            task_id = %report.task.id,
            status = %report.task.status,
            attempts = report.task.attempt + 1,
            rewards = report.rewards.len(),
            "[rq-06] Task finalized"
        );
        cell.report.send_replace(Some(report.clone()));
        self.retire(cell, &report);
        report
    }
}
