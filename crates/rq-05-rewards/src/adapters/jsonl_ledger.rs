//! Append-only JSON-lines ledger outbox.
//!
//! Each submission becomes one line; an external process ships the file to
//! the real incentive ledger.

use super::LedgerEntry;
use crate::domain::{LedgerResult, WeightVector};
use crate::ports::IncentiveLedger;
use async_trait::async_trait;
use shared_types::RewardInstruction;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::debug;

pub struct JsonlLedger {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlLedger {
    /// Open (or create) the outbox at `path`, appending to existing content.
    pub async fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every entry in the outbox.
    pub async fn read_entries(path: impl AsRef<Path>) -> LedgerResult<Vec<LedgerEntry>> {
        let file = match File::open(path.as_ref()).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut lines = BufReader::new(file).lines();
        let mut entries = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }

    async fn append(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        debug!(path = %self.path.display(), "[rq-05] Ledger entry appended");
        Ok(())
    }
}

#[async_trait]
impl IncentiveLedger for JsonlLedger {
    async fn emit_rewards(&self, instructions: Vec<RewardInstruction>) -> LedgerResult<()> {
        self.append(&LedgerEntry::Rewards { instructions }).await
    }

    async fn submit_weights(&self, weights: WeightVector) -> LedgerResult<()> {
        self.append(&LedgerEntry::Weights(weights)).await
    }
}
