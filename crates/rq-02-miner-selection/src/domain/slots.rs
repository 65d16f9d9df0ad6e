//! Per-miner accounting of outstanding dispatch requests.

use parking_lot::Mutex;
use shared_types::MinerId;
use std::collections::HashMap;

/// Outstanding request counts, guarded by `DispatchSlots`.
#[derive(Debug, Default)]
pub struct SlotTable {
    cap: usize,
    outstanding: HashMap<MinerId, usize>,
}

impl SlotTable {
    pub fn has_capacity(&self, miner_id: &MinerId) -> bool {
        self.outstanding(miner_id) < self.cap
    }

    pub fn outstanding(&self, miner_id: &MinerId) -> usize {
        self.outstanding.get(miner_id).copied().unwrap_or(0)
    }

    /// Take one slot; false (and no change) when the miner is at the cap.
    pub fn acquire(&mut self, miner_id: &MinerId) -> bool {
        if !self.has_capacity(miner_id) {
            return false;
        }
        *self.outstanding.entry(miner_id.clone()).or_insert(0) += 1;
        true
    }

    fn release(&mut self, miner_id: &MinerId) {
        if let Some(count) = self.outstanding.get_mut(miner_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.outstanding.remove(miner_id);
            }
        }
    }
}

/// Concurrency cap on outstanding dispatch requests per miner.
#[derive(Debug)]
pub struct DispatchSlots {
    table: Mutex<SlotTable>,
}

impl DispatchSlots {
    pub fn new(cap: usize) -> Self {
        Self {
            table: Mutex::new(SlotTable {
                cap,
                outstanding: HashMap::new(),
            }),
        }
    }

    pub fn cap(&self) -> usize {
        self.table.lock().cap
    }

    /// Run `f` with exclusive access to the slot table.
    pub fn transact<R>(&self, f: impl FnOnce(&mut SlotTable) -> R) -> R {
        f(&mut self.table.lock())
    }

    /// Return one slot of `miner_id`.
    pub fn release(&self, miner_id: &MinerId) {
        self.table.lock().release(miner_id);
    }

    pub fn outstanding(&self, miner_id: &MinerId) -> usize {
        self.table.lock().outstanding(miner_id)
    }

    /// Largest outstanding count over all miners.
    pub fn max_outstanding(&self) -> usize {
        self.table
            .lock()
            .outstanding
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }

    pub fn total_outstanding(&self) -> usize {
        self.table.lock().outstanding.values().sum()
    }
}
