//! # File-backed registry store
//!
//! Persists the registry as a JSON snapshot. Writes go through a temp file,
//! `sync_all` and an atomic rename, so a crash mid-write leaves the previous
//! snapshot intact. An exclusive `fs2` lock on `<file>.lock` keeps a second
//! orchestrator process from sharing the same registry.

use crate::ports::{RegistryStore, StoreError};
use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::MinerRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    records: Vec<MinerRecord>,
}

/// JSON snapshot store with an exclusive process lock.
pub struct FileRegistryStore {
    path: PathBuf,
    /// Held open for the lifetime of the store to keep the lock.
    _lock: File,
    write_guard: Mutex<()>,
}

impl FileRegistryStore {
    /// Open (or prepare) the registry file at `path` and take the process lock.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        lock.try_lock_exclusive()
            .map_err(|_| StoreError::Locked(lock_path.clone()))?;

        info!("[rq-01] Registry store opened at {}", path.display());

        Ok(Self {
            path,
            _lock: lock,
            write_guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for FileRegistryStore {
    fn load(&self) -> Result<Vec<MinerRecord>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("[rq-01] No registry file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let file: RegistryFile =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        if file.version != FORMAT_VERSION {
            return Err(StoreError::Corrupt {
                path: self.path.clone(),
                message: format!("unsupported format version {}", file.version),
            });
        }

        Ok(file.records)
    }

    fn save(&self, records: &[MinerRecord]) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock();

        let bytes = serde_json::to_vec_pretty(&RegistryFile {
            version: FORMAT_VERSION,
            records: records.to_vec(),
        })
        .map_err(|e| StoreError::Io(e.to_string()))?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| StoreError::Io(e.to_string()))?;
        file.write_all(&bytes)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.sync_all().map_err(|e| StoreError::Io(e.to_string()))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;

        debug!(
            "[rq-01] Saved {} miner records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}
