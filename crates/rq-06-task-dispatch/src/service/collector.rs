//! Response collector: ingestion, incremental evaluation and the
//! await-quorum-or-deadline suspension point.

use super::{Core, TaskCell};
use crate::domain::{Collection, OrchestratorResult, ResponseAck};
use crate::metrics;
use rq_03_consensus_verifier::{Verdict, VerificationInput};
use shared_types::{Fingerprint, MinerId, TaskId};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

impl Core {
    /// Record one response and wake the task's driver.
    pub(super) fn accept_response(
        &self,
        cell: &TaskCell,
        miner_id: MinerId,
        fingerprint: Fingerprint,
        artifact_ref: String,
    ) -> OrchestratorResult<ResponseAck> {
        let now = self.now();
        let (task_id, outcome) = {
            let mut collection = cell.collection.lock();
            let outcome = collection.record(&miner_id, fingerprint, artifact_ref, now);
            (collection.task().id, outcome)
        };

        match outcome {
            Ok(ResponseAck::Accepted) => {
                self.selector.release(&miner_id);
                if let Err(e) = self.registry.touch(&miner_id) {
                    debug!(miner_id = %miner_id, "[rq-06] Could not touch miner: {}", e);
                }
                debug!(task_id = %task_id, miner_id = %miner_id, "[rq-06] Response accepted");
                cell.wake.notify_one();
                Ok(ResponseAck::Accepted)
            }
            Ok(ResponseAck::Ignored) => {
                debug!(task_id = %task_id, miner_id = %miner_id, "[rq-06] Late response ignored");
                Ok(ResponseAck::Ignored)
            }
            Err(e) => {
                metrics::record_response_rejected(e.label());
                warn!(task_id = %task_id, miner_id = %miner_id, "[rq-06] Response dropped: {}", e);
                Err(e)
            }
        }
    }

    /// Evaluate the responses gathered so far.
    fn evaluate(&self, collection: &Collection) -> Verdict {
        let pending = collection.pending();
        let stakes = self.stakes(
            collection
                .responses()
                .iter()
                .map(|r| &r.miner_id)
                .chain(pending.iter()),
        );
        let task = collection.task();
        self.verifier.evaluate(&VerificationInput {
            task_id: task.id,
            redundancy_factor: task.redundancy_factor,
            responses: collection.responses(),
            stakes: &stakes,
            pending: &pending,
            now: self.now(),
        })
    }

    /// Wait until the verdict of the current attempt is settled or the
    /// attempt's deadline passes, then close every open request.
    ///
    /// Evaluation and closing happen under one lock, so no response can
    /// slip in between the final verdict and the closed requests.
    pub(super) async fn collect(&self, cell: &TaskCell, deadline: Instant) -> Verdict {
        let task_id = cell.task_id();
        loop {
            let settled = {
                let mut collection = cell.collection.lock();
                let verdict = self.evaluate(&collection);
                if verdict.settled {
                    Some((verdict, collection.cancel_outstanding()))
                } else {
                    None
                }
            };
            if let Some((verdict, cancelled)) = settled {
                if !cancelled.is_empty() {
                    debug!(
                        task_id = %task_id,
                        cancelled = cancelled.len(),
                        "[rq-06] Verdict locked early"
                    );
                }
                self.close_requests(task_id, &cancelled).await;
                return verdict;
            }

            tokio::select! {
                _ = cell.wake.notified() => {}
                _ = sleep_until(deadline) => {
                    let (verdict, expired) = {
                        let mut collection = cell.collection.lock();
                        let expired = collection.expire_outstanding();
                        (self.evaluate(&collection), expired)
                    };
                    info!(
                        task_id = %task_id,
                        silent = expired.len(),
                        "[rq-06] Attempt deadline reached"
                    );
                    self.close_requests(task_id, &expired).await;
                    return verdict;
                }
            }
        }
    }

    /// Free the dispatch slots of `miners` and tell them to stop.
    async fn close_requests(&self, task_id: TaskId, miners: &[MinerId]) {
        for miner_id in miners {
            self.selector.release(miner_id);
            if let Err(e) = self.transport.cancel(task_id, miner_id).await {
                debug!(
                    task_id = %task_id,
                    miner_id = %miner_id,
                    "[rq-06] Cancel not delivered: {}",
                    e
                );
            }
        }
    }
}
