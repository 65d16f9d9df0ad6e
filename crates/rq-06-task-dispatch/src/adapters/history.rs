//! Task history adapters.

use crate::domain::TaskReport;
use crate::ports::{HistoryError, TaskHistory};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// History kept in memory (tests, ephemeral nodes).
#[derive(Debug, Default)]
pub struct InMemoryTaskHistory {
    records: RwLock<Vec<TaskReport>>,
}

impl InMemoryTaskHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl TaskHistory for InMemoryTaskHistory {
    async fn append(&self, report: &TaskReport) -> Result<(), HistoryError> {
        self.records.write().push(report.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<TaskReport>, HistoryError> {
        Ok(self.records.read().clone())
    }
}

/// One JSON document per line, append-only.
pub struct JsonlTaskHistory {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlTaskHistory {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
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
}

#[async_trait]
impl TaskHistory for JsonlTaskHistory {
    async fn append(&self, report: &TaskReport) -> Result<(), HistoryError> {
        let mut line = serde_json::to_vec(report)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.sync_data().await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<TaskReport>, HistoryError> {
        // Hold the writer lock so a concurrent append is never half-read.
        let _guard = self.file.lock().await;
        let file = File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();
        let mut line_no = 0;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| HistoryError::Corrupt {
                line: line_no,
                message: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}
