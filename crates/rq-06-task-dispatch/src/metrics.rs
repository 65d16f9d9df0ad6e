//! # Orchestrator Metrics
//!
//! Prometheus metrics for monitoring task throughput and outcomes.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! rq-06-task-dispatch = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `orchestrator_tasks_submitted_total` - Counter of accepted task submissions
//! - `orchestrator_tasks_finalized_total` - Counter of final tasks (by status)
//! - `orchestrator_responses_rejected_total` - Counter of rejected responses (by reason)
//! - `orchestrator_time_to_final_seconds` - Histogram of submission-to-final times

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Tasks accepted by `submit`
    pub static ref TASKS_SUBMITTED: IntCounter = register_int_counter!(
        "orchestrator_tasks_submitted_total",
        "Total number of tasks accepted for dispatch"
    )
    .expect("Failed to create TASKS_SUBMITTED metric");

    /// Tasks that reached a final status, labeled by that status
    pub static ref TASKS_FINALIZED: IntCounterVec = register_int_counter_vec!(
        "orchestrator_tasks_finalized_total",
        "Total number of tasks that reached a final status",
        &["status"]
    )
    .expect("Failed to create TASKS_FINALIZED metric");

    /// Responses rejected at ingestion, labeled by reason
    pub static ref RESPONSES_REJECTED: IntCounterVec = register_int_counter_vec!(
        "orchestrator_responses_rejected_total",
        "Total number of miner responses rejected",
        &["reason"]
    )
    .expect("Failed to create RESPONSES_REJECTED metric");

    /// Time from submission until the task became final
    pub static ref TIME_TO_FINAL: Histogram = register_histogram!(
        "orchestrator_time_to_final_seconds",
        "Time from task submission to final status in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .expect("Failed to create TIME_TO_FINAL metric");
}

/// Record an accepted submission
#[cfg(feature = "metrics")]
pub fn record_task_submitted() {
    TASKS_SUBMITTED.inc();
}

/// Record a task reaching a final status
#[cfg(feature = "metrics")]
pub fn record_task_finalized(status: &str, seconds: f64) {
    TASKS_FINALIZED.with_label_values(&[status]).inc();
    TIME_TO_FINAL.observe(seconds);
}

/// Record a rejected response with reason
#[cfg(feature = "metrics")]
pub fn record_response_rejected(reason: &str) {
    RESPONSES_REJECTED.with_label_values(&[reason]).inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_task_submitted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_task_finalized(_status: &str, _seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_response_rejected(_reason: &str) {}
