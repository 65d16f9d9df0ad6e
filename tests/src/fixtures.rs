//! # Test Fixtures
//!
//! A full orchestrator stack on file-backed adapters plus a scripted miner
//! fleet that answers dispatch requests coming out of the transport.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use rq_01_miner_registry::{FileRegistryStore, MinerRegistry, PopulationEntry, RegistryConfig};
use rq_02_miner_selection::{DispatchSlots, SelectionConfig, WeightedSelector};
use rq_03_consensus_verifier::{StakeWeightedVerifier, VerifierConfig};
use rq_04_reputation::{PerformanceTracker, RegistryScorer, ScoringConfig};
use rq_05_rewards::{JsonlLedger, ProportionalRewards, RewardConfig};
use rq_06_task_dispatch::{
    ChannelTransport, DispatchConfig, JsonlTaskHistory, Orchestrator, OrchestratorApi,
    OrchestratorDependencies, OutboundMessage,
};
use shared_types::{DispatchRequest, Fingerprint, MinerId, OperationKind, Task, TaskId};

pub const REPOSITORY: &str = "rad:z3gqcJUoA1n9HaHKufZs5FCSGazv5";
pub const PAYLOAD: &str = "commit:9f2c1e04";
pub const BUDGET: u128 = 1_000;

/// Policy knobs of a [`Stack`].
#[derive(Debug, Clone, Default)]
pub struct StackConfig {
    pub registry: RegistryConfig,
    pub selection: SelectionConfig,
    pub verifier: VerifierConfig,
    pub dispatch: DispatchConfig,
}

/// Every subsystem wired on file-backed adapters under one data directory.
pub struct Stack {
    pub orchestrator: Arc<Orchestrator>,
    pub registry: Arc<MinerRegistry>,
    pub selector: Arc<WeightedSelector>,
    pub tracker: Arc<PerformanceTracker>,
    pub outbound: Option<UnboundedReceiver<OutboundMessage>>,
    pub data_dir: PathBuf,
}

impl Stack {
    /// Open (or reopen) the stack in `dir` and make sure `miners` are
    /// registered and serving. Existing reputations are kept.
    pub async fn open(dir: &Path, miners: &[(&str, u128)], config: StackConfig) -> Self {
        let store = FileRegistryStore::open(dir.join("registry.json")).unwrap();
        let registry = Arc::new(MinerRegistry::open(config.registry, Arc::new(store)).unwrap());
        if !miners.is_empty() {
            registry.sync_population(
                miners
                    .iter()
                    .map(|(id, stake)| PopulationEntry {
                        miner_id: MinerId::new(*id),
                        stake_weight: *stake,
                        serving: true,
                    })
                    .collect(),
            );
        }

        let selector = Arc::new(WeightedSelector::new(registry.clone(), config.selection));
        let tracker = Arc::new(PerformanceTracker::default());
        let scorer = RegistryScorer::new(registry.clone(), ScoringConfig::default())
            .with_tracker(Arc::clone(&tracker));
        let ledger = JsonlLedger::open(dir.join("ledger.jsonl")).await.unwrap();
        let history = JsonlTaskHistory::open(dir.join("history.jsonl"))
            .await
            .unwrap();
        let (transport, outbound) = ChannelTransport::new();

        let orchestrator = Arc::new(Orchestrator::new(OrchestratorDependencies {
            registry: registry.clone(),
            selector: selector.clone(),
            verifier: Arc::new(StakeWeightedVerifier::new(config.verifier)),
            scorer: Arc::new(scorer),
            rewards: Arc::new(ProportionalRewards::new(RewardConfig { budget: BUDGET })),
            ledger: Arc::new(ledger),
            transport: Arc::new(transport),
            history: Arc::new(history),
            config: config.dispatch,
        }));

        Self {
            orchestrator,
            registry,
            selector,
            tracker,
            outbound: Some(outbound),
            data_dir: dir.to_path_buf(),
        }
    }

    pub async fn submit(&self, redundancy_factor: u32) -> Task {
        self.submit_payload(PAYLOAD, redundancy_factor).await
    }

    pub async fn submit_payload(&self, payload: &str, redundancy_factor: u32) -> Task {
        self.orchestrator
            .submit(
                OperationKind::Push,
                REPOSITORY.into(),
                payload.into(),
                redundancy_factor,
            )
            .await
            .unwrap()
    }

    /// Hand the transport's receiving end to a scripted fleet.
    pub fn spawn_fleet(&mut self, script: Script) -> Fleet {
        let outbound = self.outbound.take().expect("fleet already spawned");
        Fleet::spawn(
            Arc::clone(&self.orchestrator),
            outbound,
            script,
            self.selector.slots(),
        )
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger.jsonl")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.jsonl")
    }
}

/// Decides how a miner answers one dispatch request: the fingerprint to
/// report, or `None` to stay silent. The second argument is the request's
/// position among all requests of its task seen so far.
pub type Script = Box<dyn Fn(&DispatchRequest, usize) -> Option<String> + Send + Sync>;

/// Script answering with a fixed fingerprint per miner; unlisted miners stay silent.
pub fn answers(table: &[(&str, &str)]) -> Script {
    let table: HashMap<MinerId, String> = table
        .iter()
        .map(|(id, fp)| (MinerId::new(*id), fp.to_string()))
        .collect();
    Box::new(move |request, _| table.get(&request.miner_id).cloned())
}

/// Script where every miner agrees on `fingerprint`.
pub fn unanimous(fingerprint: &str) -> Script {
    let fingerprint = fingerprint.to_string();
    Box::new(move |_, _| Some(fingerprint.clone()))
}

/// What the fleet observed.
#[derive(Debug, Default)]
pub struct FleetLog {
    pub dispatched: Vec<DispatchRequest>,
    pub cancelled: Vec<(TaskId, MinerId)>,
    /// Highest per-miner outstanding count seen at any dispatch.
    pub peak_outstanding: usize,
}

impl FleetLog {
    /// Requests of `task_id` issued in `attempt`, ordered by miner id.
    pub fn requests(&self, task_id: TaskId, attempt: u32) -> Vec<DispatchRequest> {
        let mut requests: Vec<DispatchRequest> = self
            .dispatched
            .iter()
            .filter(|r| r.task_id == task_id && r.attempt == attempt)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.miner_id.cmp(&b.miner_id));
        requests
    }
}

/// Simulated miners answering through `OrchestratorApi::submit_response`.
pub struct Fleet {
    handle: JoinHandle<()>,
    log: Arc<Mutex<FleetLog>>,
}

impl Fleet {
    fn spawn(
        orchestrator: Arc<Orchestrator>,
        mut outbound: UnboundedReceiver<OutboundMessage>,
        script: Script,
        slots: Arc<DispatchSlots>,
    ) -> Self {
        let log = Arc::new(Mutex::new(FleetLog::default()));
        let fleet_log = Arc::clone(&log);

        let handle = tokio::spawn(async move {
            let mut seen_per_task: HashMap<TaskId, usize> = HashMap::new();
            while let Some(message) = outbound.recv().await {
                let request = match message {
                    OutboundMessage::Dispatch(request) => request,
                    OutboundMessage::Cancel { task_id, miner_id } => {
                        fleet_log.lock().cancelled.push((task_id, miner_id));
                        continue;
                    }
                };

                let nth = seen_per_task.entry(request.task_id).or_insert(0);
                let answer = script(&request, *nth);
                *nth += 1;
                {
                    let mut log = fleet_log.lock();
                    log.peak_outstanding = log.peak_outstanding.max(slots.max_outstanding());
                    log.dispatched.push(request.clone());
                }

                if let Some(fingerprint) = answer {
                    let artifact = format!("rad:artifact/{fingerprint}/{}", request.miner_id);
                    // Late answers are acknowledged as ignored; both are fine here.
                    let _ = orchestrator
                        .submit_response(
                            request.task_id,
                            request.miner_id.clone(),
                            Fingerprint::new(fingerprint),
                            artifact,
                        )
                        .await;
                }
            }
        });

        Self { handle, log }
    }

    pub fn log(&self) -> parking_lot::MutexGuard<'_, FleetLog> {
        self.log.lock()
    }

    /// Stop the fleet and wait until it released the orchestrator.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}
