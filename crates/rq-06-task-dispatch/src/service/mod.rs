//! Orchestrator Service
//!
//! Wires selection, dispatch, collection, verification, scoring and rewards
//! into one task lifecycle.
//!
//! # Task driver
//!
//! Every dispatched task gets one spawned driver. The driver is the only
//! writer of the task's lifecycle after dispatch; `submit_response` only
//! records responses and wakes it.
//!
//! ```text
//! submit ──► select + Dispatched ──► spawn driver
//!                                      │
//!             ┌────────────────────────┘
//!             ▼
//!       send requests ──► wait (response | deadline) ──► evaluate
//!             ▲                                            │
//!             │ retry (silent miners, budget left)         ▼
//!             └───────────────────────────────── Resolved / Failed / TimedOut
//!                                                          │
//!                                     score ─► rewards ─► ledger ─► history
//! ```
//!
//! A finalized task leaves the live map for a bounded archive; tasks evicted
//! from the archive are looked up in the task history.

mod collector;
mod dispatcher;


use crate::domain::{
    ArchivedTask, Collection, DispatchConfig, OrchestratorError, OrchestratorResult, ResponseAck,
    TaskArchive, TaskReport, TaskStatusView,
};
use crate::metrics;
use crate::ports::{MinerTransport, OrchestratorApi, TaskHistory};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rq_01_miner_registry::MinerRegistryApi;
use rq_02_miner_selection::MinerSelector;
use rq_03_consensus_verifier::ConsensusVerifier;
use rq_04_reputation::ReputationScorer;
use rq_05_rewards::{IncentiveLedger, RewardComputer};
use shared_types::{
    FailureReason, Fingerprint, MinerId, MinerRecord, OperationKind, SystemTimeSource, Task,
    TaskId, TaskStatus, TimeSource,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Dependencies for the orchestrator
pub struct OrchestratorDependencies {
    pub registry: Arc<dyn MinerRegistryApi>,
    pub selector: Arc<dyn MinerSelector>,
    pub verifier: Arc<dyn ConsensusVerifier>,
    pub scorer: Arc<dyn ReputationScorer>,
    pub rewards: Arc<dyn RewardComputer>,
    pub ledger: Arc<dyn IncentiveLedger>,
    pub transport: Arc<dyn MinerTransport>,
    pub history: Arc<dyn TaskHistory>,
    pub config: DispatchConfig,
}

/// Shared state of one task.
struct TaskCell {
    collection: Mutex<Collection>,
    /// Pinged on every accepted response.
    wake: Notify,
    /// Filled exactly once, when the task is final.
    report: watch::Sender<Option<TaskReport>>,
    submitted: Instant,
}

impl TaskCell {
    fn new(task: Task) -> Self {
        let (report, _) = watch::channel(None);
        Self {
            collection: Mutex::new(Collection::new(task)),
            wake: Notify::new(),
            report,
            submitted: Instant::now(),
        }
    }

    fn task_id(&self) -> TaskId {
        self.collection.lock().task().id
    }
}

struct Core {
    registry: Arc<dyn MinerRegistryApi>,
    selector: Arc<dyn MinerSelector>,
    verifier: Arc<dyn ConsensusVerifier>,
    scorer: Arc<dyn ReputationScorer>,
    rewards: Arc<dyn RewardComputer>,
    ledger: Arc<dyn IncentiveLedger>,
    transport: Arc<dyn MinerTransport>,
    history: Arc<dyn TaskHistory>,
    config: DispatchConfig,
    time_source: Arc<dyn TimeSource>,
    /// Tasks that are not final yet.
    tasks: RwLock<HashMap<TaskId, Arc<TaskCell>>>,
    archive: Mutex<TaskArchive>,
    closed: AtomicBool,
    active_drivers: AtomicUsize,
    drivers_idle: Notify,
}

impl Core {
    fn now(&self) -> u64 {
        self.time_source.now_millis()
    }

    fn live(&self, task_id: TaskId) -> Option<Arc<TaskCell>> {
        self.tasks.read().get(&task_id).cloned()
    }

    fn archived(&self, task_id: TaskId) -> Option<ArchivedTask> {
        self.archive.lock().get(&task_id).cloned()
    }

    /// Report of a task that already left the live map.
    async fn finished_report(&self, task_id: TaskId) -> OrchestratorResult<TaskReport> {
        if let Some(archived) = self.archived(task_id) {
            return Ok(archived.report);
        }
        self.history
            .find(task_id)
            .await?
            .ok_or(OrchestratorError::UnknownTask(task_id))
    }

    /// Move a finalized task from the live map to the archive.
    fn retire(&self, cell: &TaskCell, report: &TaskReport) {
        let archived = {
            let collection = cell.collection.lock();
            ArchivedTask {
                report: report.clone(),
                selected: collection.selected().clone(),
                responded: collection
                    .responses()
                    .iter()
                    .map(|r| r.miner_id.clone())
                    .collect(),
            }
        };
        if let Some(evicted) = self.archive.lock().insert(archived) {
            debug!(task_id = %evicted, "[rq-06] Task evicted from archive");
        }
        self.tasks.write().remove(&report.task.id);
    }

    /// Persist the registry off the async workers.
    async fn flush_registry(&self) -> OrchestratorResult<()> {
        let registry = Arc::clone(&self.registry);
        tokio::task::spawn_blocking(move || registry.flush())
            .await
            .map_err(|e| OrchestratorError::Internal(format!("registry flush panicked: {e}")))??;
        Ok(())
    }

    /// Stake of each listed miner; unknown miners weigh nothing.
    fn stakes<'a>(&self, miners: impl IntoIterator<Item = &'a MinerId>) -> HashMap<MinerId, u128> {
        miners
            .into_iter()
            .map(|id| {
                let stake = self.registry.get(id).map(|r| r.stake_weight).unwrap_or(0);
                (id.clone(), stake)
            })
            .collect()
    }
}

/// Decrements the in-flight driver count when a driver ends, however it ends.
struct DriverGuard(Arc<Core>);

impl Drop for DriverGuard {
    fn drop(&mut self) {
        if self.0.active_drivers.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.drivers_idle.notify_waiters();
        }
    }
}

/// Orchestrator
pub struct Orchestrator {
    core: Arc<Core>,
}

impl Orchestrator {
    pub fn new(deps: OrchestratorDependencies) -> Self {
        let archive = TaskArchive::new(deps.config.archive_capacity);
        Self {
            core: Arc::new(Core {
                registry: deps.registry,
                selector: deps.selector,
                verifier: deps.verifier,
                scorer: deps.scorer,
                rewards: deps.rewards,
                ledger: deps.ledger,
                transport: deps.transport,
                history: deps.history,
                config: deps.config,
                time_source: Arc::new(SystemTimeSource),
                tasks: RwLock::new(HashMap::new()),
                archive: Mutex::new(archive),
                closed: AtomicBool::new(false),
                active_drivers: AtomicUsize::new(0),
                drivers_idle: Notify::new(),
            }),
        }
    }

    /// Set custom time source (for testing). Only effective before the
    /// first task is submitted.
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        if let Some(core) = Arc::get_mut(&mut self.core) {
            core.time_source = time_source;
        }
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.core.config
    }

    /// Tasks not finalized yet.
    pub fn live_tasks(&self) -> usize {
        self.core.tasks.read().len()
    }

    /// Finalized tasks still held in memory.
    pub fn archived_tasks(&self) -> usize {
        self.core.archive.lock().len()
    }

    /// Number of tasks whose driver is still running.
    pub fn in_flight(&self) -> usize {
        self.core.active_drivers.load(Ordering::SeqCst)
    }

    /// Stop accepting tasks, give running drivers up to `grace` to finish,
    /// then persist the registry.
    pub async fn shutdown(&self, grace: Duration) -> OrchestratorResult<()> {
        self.core.closed.store(true, Ordering::SeqCst);

        let drained = tokio::time::timeout(grace, async {
            loop {
                let idle = self.core.drivers_idle.notified();
                if self.core.active_drivers.load(Ordering::SeqCst) == 0 {
                    break;
                }
                idle.await;
            }
        })
        .await
        .is_ok();

        if !drained {
            warn!(
                in_flight = self.in_flight(),
                "[rq-06] Shutdown grace elapsed with tasks still in flight"
            );
        }
        self.core.flush_registry().await?;
        info!("[rq-06] Orchestrator stopped");
        Ok(())
    }

    fn validate(
        repository_ref: &str,
        payload_ref: &str,
        redundancy_factor: u32,
    ) -> OrchestratorResult<()> {
        if payload_ref.trim().is_empty() {
            return Err(OrchestratorError::InvalidTask(
                "payload reference is empty".into(),
            ));
        }
        if repository_ref.trim().is_empty() {
            return Err(OrchestratorError::InvalidTask(
                "repository reference is empty".into(),
            ));
        }
        if redundancy_factor == 0 {
            return Err(OrchestratorError::InvalidTask(
                "redundancy factor must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrchestratorApi for Orchestrator {
    async fn submit(
        &self,
        operation: OperationKind,
        repository_ref: String,
        payload_ref: String,
        redundancy_factor: u32,
    ) -> OrchestratorResult<Task> {
        if self.core.closed.load(Ordering::SeqCst) {
            return Err(OrchestratorError::ShuttingDown);
        }
        Self::validate(&repository_ref, &payload_ref, redundancy_factor)?;

        let task = Task::new(
            operation,
            repository_ref,
            payload_ref,
            redundancy_factor,
            self.core.now(),
        );
        let task_id = task.id;
        let cell = Arc::new(TaskCell::new(task));
        self.core.tasks.write().insert(task_id, Arc::clone(&cell));
        metrics::record_task_submitted();

        let first_attempt = {
            let mut collection = cell.collection.lock();
            self.core
                .begin_attempt(&mut collection, redundancy_factor)
                .map(|requests| (requests, collection.task().clone()))
        };

        match first_attempt {
            Ok((requests, task)) => {
                info!(
                    task_id = %task_id,
                    operation = %task.operation,
                    miners = requests.len(),
                    "[rq-06] Task dispatched"
                );
                self.core.active_drivers.fetch_add(1, Ordering::SeqCst);
                let guard = DriverGuard(Arc::clone(&self.core));
                let core = Arc::clone(&self.core);
                tokio::spawn(async move {
                    let _guard = guard;
                    core.drive(cell, requests).await;
                });
                Ok(task)
            }
            Err(e @ OrchestratorError::InsufficientMiners { .. }) => {
                warn!(task_id = %task_id, "[rq-06] Task not dispatched: {}", e);
                let status = TaskStatus::Failed(FailureReason::InsufficientMiners);
                let concluded = cell.collection.lock().conclude(status, None);
                if let Err(e) = concluded {
                    warn!(task_id = %task_id, "[rq-06] {}", e);
                }
                let report = self.core.finalize(&cell).await;
                Ok(report.task)
            }
            Err(e) => {
                error!(task_id = %task_id, "[rq-06] Dispatch aborted: {}", e);
                self.core.tasks.write().remove(&task_id);
                Err(e)
            }
        }
    }

    async fn get_status(&self, task_id: TaskId) -> OrchestratorResult<TaskStatusView> {
        let Some(cell) = self.core.live(task_id) else {
            return Ok(self.core.finished_report(task_id).await?.status_view());
        };
        let collection = cell.collection.lock();
        let status = collection.task().status;
        let consensus = collection
            .consensus()
            .filter(|_| status == TaskStatus::Resolved);
        Ok(TaskStatusView {
            task_id,
            status,
            canonical_fingerprint: consensus.and_then(|c| c.canonical_fingerprint.clone()),
            artifact_ref: consensus.and_then(|c| c.canonical_artifact.clone()),
        })
    }

    async fn submit_response(
        &self,
        task_id: TaskId,
        miner_id: MinerId,
        fingerprint: Fingerprint,
        artifact_ref: String,
    ) -> OrchestratorResult<ResponseAck> {
        if let Some(cell) = self.core.live(task_id) {
            return self
                .core
                .accept_response(&cell, miner_id, fingerprint, artifact_ref);
        }
        let outcome = match self.core.archived(task_id) {
            Some(archived) => archived.classify_response(&miner_id),
            None => Err(OrchestratorError::UnknownTask(task_id)),
        };
        match &outcome {
            Ok(_) => {
                debug!(task_id = %task_id, miner_id = %miner_id, "[rq-06] Late response ignored");
            }
            Err(e) => {
                metrics::record_response_rejected(e.label());
                warn!(task_id = %task_id, miner_id = %miner_id, "[rq-06] Response dropped: {}", e);
            }
        }
        outcome
    }

    async fn await_result(&self, task_id: TaskId) -> OrchestratorResult<TaskReport> {
        let Some(cell) = self.core.live(task_id) else {
            return self.core.finished_report(task_id).await;
        };
        let mut receiver = cell.report.subscribe();
        let report = receiver
            .wait_for(|report| report.is_some())
            .await
            .map_err(|_| OrchestratorError::ShuttingDown)?
            .clone();
        report.ok_or(OrchestratorError::ShuttingDown)
    }

    async fn registry_snapshot(&self) -> Vec<MinerRecord> {
        debug!("[rq-06] Registry snapshot requested");
        self.core.registry.snapshot()
    }
}
