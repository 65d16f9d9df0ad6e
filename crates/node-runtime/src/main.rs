//! # Radquorum Node Runtime
//!
//! The main entry point for the Radquorum orchestrator.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults + `RQ_*` environment)
//! 2. Open the stores under the data directory and wire the subsystems
//! 3. Sync the miner population file (if configured)
//! 4. Start housekeeping (weight emitter, outbound drain)
//! 5. Run until Ctrl+C, then drain in-flight tasks and persist the registry

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::container::{load_config, NodeConfig, SubsystemContainer};
use node_runtime::wiring::{drain_outbound, run_weight_emitter, sync_population_file};
use rq_06_task_dispatch::OutboundMessage;
use shared_types::SystemTimeSource;

/// The node runtime owning all subsystems and background tasks.
struct NodeRuntime {
    container: SubsystemContainer,
    outbound: Option<UnboundedReceiver<OutboundMessage>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    async fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating Radquorum node runtime");
        let (container, outbound) = SubsystemContainer::build(config)
            .await
            .context("Failed to initialize subsystems")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            container,
            outbound: Some(outbound),
            shutdown_tx,
            shutdown_rx,
            handles: Vec::new(),
        })
    }

    fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Radquorum Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let config = &self.container.config;
        if let Some(path) = &config.storage.population_file {
            let report = sync_population_file(&self.container.registry, path)
                .context("Failed to sync miner population")?;
            info!(
                added = report.added.len(),
                updated = report.updated,
                departed = report.departed.len(),
                "Population synced"
            );
        }

        self.handles.push(tokio::spawn(run_weight_emitter(
            Arc::clone(&self.container.tracker),
            self.container.ledger.clone(),
            Arc::new(SystemTimeSource),
            config.housekeeping.weight_interval,
            self.shutdown_rx.clone(),
        )));

        if let Some(outbound) = self.outbound.take() {
            let mut shutdown = self.shutdown_rx.clone();
            self.handles.push(tokio::spawn(async move {
                tokio::select! {
                    seen = drain_outbound(outbound) => {
                        info!(seen, "[rq-06] Outbound channel closed");
                    }
                    _ = shutdown.changed() => {
                        info!("[rq-06] Outbound drain stopped");
                    }
                }
            }));
        }

        info!("Miners: {}", self.container.registry.len());
        info!("Data Dir: {:?}", config.storage.data_dir);
        info!(
            "Task timeout: {:?}, retry budget: {}",
            config.dispatch.task_timeout, config.dispatch.retry_budget
        );
        Ok(())
    }

    /// Shutdown the node gracefully.
    ///
    /// In-flight tasks get the configured grace period; the registry is
    /// persisted either way.
    async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        let grace = self.container.config.housekeeping.shutdown_grace;
        if let Err(e) = self.container.orchestrator.shutdown(grace).await {
            error!("Failed to persist registry on shutdown: {}", e);
        }

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Background task ended abnormally: {}", e);
            }
        }

        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config().context("Invalid configuration")?;

    let mut runtime = NodeRuntime::new(config).await?;
    runtime.start()?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
