//! Miner Registry Service
//!
//! Owns the live set of `MinerRecord`s. Records are independently lockable;
//! see the crate docs for the locking layout.

use crate::domain::{
    apply_score_delta, merge_population_entry, PopulationEntry, RegistryConfig, RegistryError,
    RegistryResult, SyncReport,
};
use crate::ports::{MinerRegistryApi, RegistryStore};
use parking_lot::{Mutex, RwLock};
use shared_types::{MinerId, MinerRecord, SystemTimeSource, TimeSource};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

type RecordCell = Arc<Mutex<MinerRecord>>;

/// Miner Registry
pub struct MinerRegistry {
    records: RwLock<HashMap<MinerId, RecordCell>>,
    config: RegistryConfig,
    store: Arc<dyn RegistryStore>,
    /// Held from snapshot to save, so snapshots reach the store in order.
    flush_lock: Mutex<()>,
    time_source: Arc<dyn TimeSource>,
}

impl MinerRegistry {
    /// Open the registry, restoring every record the store holds.
    ///
    /// Persisted scores are clamped into the configured bounds on load.
    pub fn open(config: RegistryConfig, store: Arc<dyn RegistryStore>) -> RegistryResult<Self> {
        let persisted = store.load()?;
        let mut records = HashMap::with_capacity(persisted.len());
        for mut record in persisted {
            record.reputation_score = config.clamp_score(record.reputation_score);
            records.insert(record.miner_id.clone(), Arc::new(Mutex::new(record)));
        }

        info!("[rq-01] Registry opened with {} miners", records.len());

        Ok(Self {
            records: RwLock::new(records),
            config,
            store,
            flush_lock: Mutex::new(()),
            time_source: Arc::new(SystemTimeSource),
        })
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn cell(&self, miner_id: &MinerId) -> RegistryResult<RecordCell> {
        self.records
            .read()
            .get(miner_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(miner_id.clone()))
    }

    fn collect_sorted(&self, filter: impl Fn(&MinerRecord) -> bool) -> Vec<MinerRecord> {
        let cells: Vec<RecordCell> = self.records.read().values().cloned().collect();
        let mut records: Vec<MinerRecord> = cells
            .iter()
            .map(|cell| cell.lock().clone())
            .filter(|record| filter(record))
            .collect();
        records.sort_by(|a, b| a.miner_id.cmp(&b.miner_id));
        records
    }

    /// Register a new miner with the initial reputation score.
    pub fn register(&self, miner_id: MinerId, stake_weight: u128) -> RegistryResult<MinerRecord> {
        let mut records = self.records.write();
        if records.contains_key(&miner_id) {
            return Err(RegistryError::AlreadyRegistered(miner_id));
        }

        let mut record = MinerRecord::new(
            miner_id.clone(),
            stake_weight,
            self.config.clamp_score(self.config.initial_score),
        );
        record.last_seen_at = self.time_source.now_millis();
        records.insert(miner_id.clone(), Arc::new(Mutex::new(record.clone())));

        debug!(miner_id = %miner_id, stake_weight, "[rq-01] Miner registered");
        Ok(record)
    }

    /// Update a miner's stake weight.
    pub fn set_stake(&self, miner_id: &MinerId, stake_weight: u128) -> RegistryResult<()> {
        self.cell(miner_id)?.lock().stake_weight = stake_weight;
        Ok(())
    }

    /// Manually return a benched miner to the selectable pool.
    ///
    /// Clears the failure streak; the reputation score is left untouched.
    pub fn reinstate(&self, miner_id: &MinerId) -> RegistryResult<MinerRecord> {
        let cell = self.cell(miner_id)?;
        let mut record = cell.lock();
        record.consecutive_failures = 0;
        record.available = true;
        info!(miner_id = %miner_id, "[rq-01] Miner reinstated");
        Ok(record.clone())
    }

    /// Reconcile the registry with an externally observed miner population.
    ///
    /// Unknown miners are registered, known ones get their stake and serving
    /// state refreshed (reputation is preserved), and known miners missing
    /// from `entries` are marked unavailable.
    pub fn sync_population(&self, entries: Vec<PopulationEntry>) -> SyncReport {
        let mut report = SyncReport::default();
        let now = self.time_source.now_millis();
        let seen: HashSet<MinerId> = entries.iter().map(|e| e.miner_id.clone()).collect();

        let mut records = self.records.write();
        for entry in &entries {
            match records.get(&entry.miner_id) {
                Some(cell) => {
                    merge_population_entry(&mut cell.lock(), entry, &self.config);
                    report.updated += 1;
                }
                None => {
                    let mut record = MinerRecord::new(
                        entry.miner_id.clone(),
                        entry.stake_weight,
                        self.config.clamp_score(self.config.initial_score),
                    );
                    record.available = entry.serving;
                    record.last_seen_at = now;
                    records.insert(entry.miner_id.clone(), Arc::new(Mutex::new(record)));
                    report.added.push(entry.miner_id.clone());
                }
            }
        }

        for (miner_id, cell) in records.iter() {
            if !seen.contains(miner_id) {
                let mut record = cell.lock();
                if record.available {
                    record.available = false;
                    report.departed.push(miner_id.clone());
                }
            }
        }
        report.added.sort();
        report.departed.sort();

        info!(
            added = report.added.len(),
            updated = report.updated,
            departed = report.departed.len(),
            "[rq-01] Population synced"
        );
        report
    }
}

impl MinerRegistryApi for MinerRegistry {
    fn get(&self, miner_id: &MinerId) -> RegistryResult<MinerRecord> {
        Ok(self.cell(miner_id)?.lock().clone())
    }

    fn list_available(&self) -> Vec<MinerRecord> {
        self.collect_sorted(|record| record.available)
    }

    fn snapshot(&self) -> Vec<MinerRecord> {
        self.collect_sorted(|_| true)
    }

    fn apply_delta(
        &self,
        miner_id: &MinerId,
        score_delta: f64,
        failure: bool,
    ) -> RegistryResult<MinerRecord> {
        let cell = self.cell(miner_id)?;
        let mut record = cell.lock();
        let was_available = record.available;
        apply_score_delta(&mut record, score_delta, failure, &self.config);

        if was_available && !record.available {
            warn!(
                miner_id = %miner_id,
                failures = record.consecutive_failures,
                "[rq-01] Miner benched after repeated failures"
            );
        }
        Ok(record.clone())
    }

    fn touch(&self, miner_id: &MinerId) -> RegistryResult<()> {
        let now = self.time_source.now_millis();
        self.cell(miner_id)?.lock().last_seen_at = now;
        Ok(())
    }

    fn flush(&self) -> RegistryResult<()> {
        let _flushing = self.flush_lock.lock();
        let snapshot = self.snapshot();
        self.store.save(&snapshot).map_err(|e| {
            warn!("[rq-01] Registry flush failed: {}", e);
            RegistryError::from(e)
        })
    }

    fn max_score(&self) -> f64 {
        self.config.max_score
    }
}
