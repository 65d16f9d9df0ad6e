//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Every value has a default; `RQ_*` environment variables override them.
//! A configuration must pass [`NodeConfig::validate`] before it is wired.

use std::path::PathBuf;
use std::time::Duration;

use rq_01_miner_registry::RegistryConfig;
use rq_02_miner_selection::SelectionConfig;
use rq_03_consensus_verifier::VerifierConfig;
use rq_04_reputation::{ScoringConfig, ScoringConfigError};
use rq_05_rewards::RewardConfig;
use rq_06_task_dispatch::DispatchConfig;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// On-disk state.
    pub storage: StorageConfig,
    /// Reputation bounds and benching.
    pub registry: RegistryConfig,
    /// Miner selection policy.
    pub selection: SelectionConfig,
    /// Consensus verification policy.
    pub verifier: VerifierConfig,
    /// Reputation deltas and moving average.
    pub scoring: ScoringConfig,
    /// Per-task reward budget.
    pub rewards: RewardConfig,
    /// Deadlines and retries.
    pub dispatch: DispatchConfig,
    /// Periodic runtime work.
    pub housekeeping: HousekeepingConfig,
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the registry snapshot, ledger and task history.
    pub data_dir: PathBuf,
    /// Optional JSON list of miners synced into the registry at startup.
    pub population_file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            population_file: None,
        }
    }
}

impl StorageConfig {
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join("registry.json")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger.jsonl")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.jsonl")
    }
}

/// Housekeeping configuration.
#[derive(Debug, Clone)]
pub struct HousekeepingConfig {
    /// How often the normalized performance weights go to the ledger.
    pub weight_interval: Duration,
    /// How long shutdown waits for running tasks.
    pub shutdown_grace: Duration,
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            weight_interval: Duration::from_secs(300),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}")]
    InvalidVar { var: &'static str, value: String },

    #[error("max score must be positive and finite, got {0}")]
    InvalidMaxScore(f64),

    #[error("initial score {initial} is outside [0, {max}]")]
    InitialScoreOutOfRange { initial: f64, max: f64 },

    #[error("reputation floor must be positive, got {0}")]
    InvalidReputationFloor(f64),

    #[error("concurrency cap must be at least 1")]
    ZeroConcurrencyCap,

    #[error("task timeout must be non-zero")]
    ZeroTaskTimeout,

    #[error("weight interval must be non-zero")]
    ZeroWeightInterval,

    #[error("registry and selection disagree on the failure threshold ({registry} vs {selection})")]
    FailureThresholdMismatch { registry: u32, selection: u32 },

    #[error(transparent)]
    Scoring(#[from] ScoringConfigError),
}

impl NodeConfig {
    /// Reject values the subsystems cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = self.registry.max_score;
        if !(max.is_finite() && max > 0.0) {
            return Err(ConfigError::InvalidMaxScore(max));
        }
        let initial = self.registry.initial_score;
        if !(0.0..=max).contains(&initial) {
            return Err(ConfigError::InitialScoreOutOfRange { initial, max });
        }
        let floor = self.selection.reputation_floor;
        if !(floor.is_finite() && floor > 0.0) {
            return Err(ConfigError::InvalidReputationFloor(floor));
        }
        if self.selection.concurrency_cap == 0 {
            return Err(ConfigError::ZeroConcurrencyCap);
        }
        if self.registry.failure_threshold != self.selection.failure_threshold {
            return Err(ConfigError::FailureThresholdMismatch {
                registry: self.registry.failure_threshold,
                selection: self.selection.failure_threshold,
            });
        }
        if self.dispatch.task_timeout.is_zero() {
            return Err(ConfigError::ZeroTaskTimeout);
        }
        if self.housekeeping.weight_interval.is_zero() {
            return Err(ConfigError::ZeroWeightInterval);
        }
        self.scoring.validate()?;
        Ok(())
    }

    /// Apply `RQ_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("RQ_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("RQ_POPULATION_FILE") {
            self.storage.population_file = Some(PathBuf::from(file));
        }
        if let Some(ms) = parse_var(&lookup, "RQ_TASK_TIMEOUT_MS")? {
            self.dispatch.task_timeout = Duration::from_millis(ms);
        }
        if let Some(budget) = parse_var(&lookup, "RQ_RETRY_BUDGET")? {
            self.dispatch.retry_budget = budget;
        }
        if let Some(capacity) = parse_var(&lookup, "RQ_ARCHIVE_CAPACITY")? {
            self.dispatch.archive_capacity = capacity;
        }
        if let Some(cap) = parse_var(&lookup, "RQ_CONCURRENCY_CAP")? {
            self.selection.concurrency_cap = cap;
        }
        if let Some(seed) = parse_var(&lookup, "RQ_SELECTION_SEED")? {
            self.selection.seed = seed;
        }
        if let Some(budget) = parse_var(&lookup, "RQ_REWARD_BUDGET")? {
            self.rewards.budget = budget;
        }
        if let Some(threshold) = parse_var(&lookup, "RQ_FAILURE_THRESHOLD")? {
            self.registry.failure_threshold = threshold;
            self.selection.failure_threshold = threshold;
        }
        if let Some(secs) = parse_var(&lookup, "RQ_WEIGHT_INTERVAL_SECS")? {
            self.housekeeping.weight_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "RQ_SHUTDOWN_GRACE_SECS")? {
            self.housekeeping.shutdown_grace = Duration::from_secs(secs);
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { var, value }),
    }
}

/// Load configuration from defaults and the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    let mut config = NodeConfig::default();
    config.apply_overrides(|var| std::env::var(var).ok())?;
    config.validate()?;
    Ok(config)
}
