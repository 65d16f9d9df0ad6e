use crate::ports::{RegistryStore, StoreError};
use parking_lot::RwLock;
use shared_types::MinerRecord;

/// In-memory registry store for testing
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    records: RwLock<Vec<MinerRecord>>,
    saves: RwLock<usize>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, as if a previous process had saved `records`
    pub fn with_records(records: Vec<MinerRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            saves: RwLock::new(0),
        }
    }

    pub fn saved_records(&self) -> Vec<MinerRecord> {
        self.records.read().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.read()
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn load(&self) -> Result<Vec<MinerRecord>, StoreError> {
        Ok(self.records.read().clone())
    }

    fn save(&self, records: &[MinerRecord]) -> Result<(), StoreError> {
        *self.records.write() = records.to_vec();
        *self.saves.write() += 1;
        Ok(())
    }
}
