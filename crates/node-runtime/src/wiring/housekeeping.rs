//! Periodic runtime work.

use std::sync::Arc;
use std::time::Duration;

use rq_04_reputation::PerformanceTracker;
use rq_05_rewards::{IncentiveLedger, LedgerResult, WeightVector};
use rq_06_task_dispatch::OutboundMessage;
use shared_types::TimeSource;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Normalize the current moving averages and submit them to the ledger.
///
/// Returns the submitted vector, or `None` when no miner has a recorded
/// round yet.
pub async fn emit_weights_once(
    tracker: &PerformanceTracker,
    ledger: &dyn IncentiveLedger,
    issued_at: u64,
) -> LedgerResult<Option<WeightVector>> {
    let averages = tracker.snapshot();
    if averages.is_empty() {
        return Ok(None);
    }
    let weights = WeightVector::normalize(&averages, issued_at);
    ledger.submit_weights(weights.clone()).await?;
    Ok(Some(weights))
}

/// Submit weights every `interval` until `shutdown` flips.
///
/// The first submission happens one full interval after start.
pub async fn run_weight_emitter(
    tracker: Arc<PerformanceTracker>,
    ledger: Arc<dyn IncentiveLedger>,
    time_source: Arc<dyn TimeSource>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let issued_at = time_source.now_millis();
                match emit_weights_once(&tracker, ledger.as_ref(), issued_at).await {
                    Ok(Some(weights)) => info!(
                        miners = weights.len(),
                        zero = weights.is_zero(),
                        "[rq-05] Weight vector submitted"
                    ),
                    Ok(None) => debug!("[rq-05] No performance recorded yet, skipping weights"),
                    Err(e) => warn!("[rq-05] Weight submission failed: {}", e),
                }
            }
            _ = shutdown.changed() => {
                info!("[rq-05] Weight emitter stopped");
                break;
            }
        }
    }
}

/// Consume outbound transport messages until the transport is dropped.
///
/// Miners attach to the node out of band; here every message is only
/// logged. Returns the number of messages seen.
pub async fn drain_outbound(mut outbound: UnboundedReceiver<OutboundMessage>) -> usize {
    let mut seen = 0;
    while let Some(message) = outbound.recv().await {
        seen += 1;
        match message {
            OutboundMessage::Dispatch(request) => debug!(
                task_id = %request.task_id,
                miner_id = %request.miner_id,
                operation = %request.operation,
                attempt = request.attempt,
                "[rq-06] Dispatch request issued"
            ),
            OutboundMessage::Cancel { task_id, miner_id } => debug!(
                task_id = %task_id,
                miner_id = %miner_id,
                "[rq-06] Cancellation issued"
            ),
        }
    }
    seen
}
