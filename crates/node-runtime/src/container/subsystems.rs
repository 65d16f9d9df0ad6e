//! # Subsystem Container
//!
//! Holds all subsystem instances and wires them behind their ports.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Registry store, Miner Registry (rq-01)
//! Level 1: Selector (rq-02), Verifier (rq-03), Scorer (rq-04), Rewards (rq-05)
//! Level 2: Ledger, Task History, Transport
//! Level 3: Orchestrator (rq-06)
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use rq_01_miner_registry::{FileRegistryStore, MinerRegistry};
use rq_02_miner_selection::WeightedSelector;
use rq_03_consensus_verifier::StakeWeightedVerifier;
use rq_04_reputation::{PerformanceTracker, RegistryScorer};
use rq_05_rewards::{JsonlLedger, ProportionalRewards};
use rq_06_task_dispatch::{
    ChannelTransport, JsonlTaskHistory, Orchestrator, OrchestratorDependencies, OutboundMessage,
};

use crate::container::config::NodeConfig;

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Miner Registry (rq-01). Shared by selector, scorer and orchestrator.
    pub registry: Arc<MinerRegistry>,

    /// Miner Selector (rq-02). Owns the per-miner dispatch slots.
    pub selector: Arc<WeightedSelector>,

    /// Moving-average performance shared with the scorer (rq-04).
    pub tracker: Arc<PerformanceTracker>,

    /// Append-only incentive ledger (rq-05).
    pub ledger: Arc<JsonlLedger>,

    /// Orchestrator (rq-06).
    pub orchestrator: Arc<Orchestrator>,

    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl SubsystemContainer {
    /// Open every store under the data directory and wire the subsystems.
    ///
    /// Returns the receiving end of the miner transport next to the
    /// container; the caller decides how outbound messages leave the node.
    pub async fn build(
        config: NodeConfig,
    ) -> Result<(Self, UnboundedReceiver<OutboundMessage>)> {
        info!("Initializing Radquorum subsystem container");
        let storage = &config.storage;

        let store = FileRegistryStore::open(storage.registry_path())
            .with_context(|| format!("opening registry store in {}", storage.data_dir.display()))?;
        let registry = Arc::new(
            MinerRegistry::open(config.registry.clone(), Arc::new(store))
                .context("loading miner registry")?,
        );
        info!("  [rq-01] Miner Registry initialized ({} miners)", registry.len());

        let selector = Arc::new(WeightedSelector::new(
            registry.clone(),
            config.selection.clone(),
        ));
        let verifier = Arc::new(StakeWeightedVerifier::new(config.verifier.clone()));
        let tracker = Arc::new(PerformanceTracker::new(config.scoring.ema_alpha));
        let scorer = Arc::new(
            RegistryScorer::new(registry.clone(), config.scoring.clone())
                .with_tracker(Arc::clone(&tracker)),
        );
        let rewards = Arc::new(ProportionalRewards::new(config.rewards.clone()));
        info!("  [rq-02..rq-05] Selection, verification, scoring and rewards initialized");

        let ledger = Arc::new(
            JsonlLedger::open(storage.ledger_path())
                .await
                .context("opening incentive ledger")?,
        );
        let history = Arc::new(
            JsonlTaskHistory::open(storage.history_path())
                .await
                .context("opening task history")?,
        );
        let (transport, outbound) = ChannelTransport::new();

        let orchestrator = Arc::new(Orchestrator::new(OrchestratorDependencies {
            registry: registry.clone(),
            selector: selector.clone(),
            verifier,
            scorer,
            rewards,
            ledger: ledger.clone(),
            transport: Arc::new(transport),
            history,
            config: config.dispatch.clone(),
        }));
        info!("  [rq-06] Orchestrator initialized");

        let container = Self {
            registry,
            selector,
            tracker,
            ledger,
            orchestrator,
            config,
        };
        Ok((container, outbound))
    }
}
