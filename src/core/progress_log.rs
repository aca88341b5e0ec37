//! Append-only progress trail with file-based persistence.
//!
//! Status changes are stored as newline-delimited JSON snapshots of the
//! full `ProgressEvent`. Readers fold the log to the latest snapshot per
//! event id; writers only ever append, which is what makes concurrent
//! observation of a live run safe.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::domain::ProgressEvent;

/// Errors from progress persistence
#[derive(Debug, Error)]
pub enum ProgressLogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sink for progress events.
///
/// The orchestrator appends a snapshot on every status change (open,
/// success, failure). Implementations decide where the snapshots go.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn append(&self, event: &ProgressEvent) -> Result<(), ProgressLogError>;
}

/// JSONL-backed progress store, one file per run
pub struct ProgressLog {
    /// Directory containing the run
    run_dir: PathBuf,

    /// Path to the progress.jsonl file
    events_path: PathBuf,
}

impl ProgressLog {
    /// Create or open the progress log for a run
    pub async fn open(run_id: Uuid) -> anyhow::Result<Self> {
        let base_dir = crate::config::runs_dir()?;
        let run_dir = base_dir.join(run_id.to_string());

        fs::create_dir_all(&run_dir).await?;

        Ok(Self::at(run_dir))
    }

    /// Reference an existing run's log without creating directories.
    ///
    /// For observers: replay on a run that never recorded anything yields
    /// an empty trail and leaves the filesystem untouched.
    pub fn for_run(run_id: Uuid) -> anyhow::Result<Self> {
        let base_dir = crate::config::runs_dir()?;
        Ok(Self::at(base_dir.join(run_id.to_string())))
    }

    /// Open a progress log rooted at an explicit run directory
    pub fn at(run_dir: PathBuf) -> Self {
        let events_path = run_dir.join("progress.jsonl");
        Self {
            run_dir,
            events_path,
        }
    }

    /// Get the run directory
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Get the path to the events file
    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    /// Read every snapshot in append order
    pub async fn raw_snapshots(&self) -> Result<Vec<ProgressEvent>, ProgressLogError> {
        if !self.events_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.events_path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut events = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event: ProgressEvent = serde_json::from_str(&line)?;
            events.push(event);
        }

        Ok(events)
    }

    /// Fold the log to the latest snapshot per event, in first-seen order.
    ///
    /// This is the "row" view an observer renders: one entry per milestone,
    /// current status, monotonically increasing step indices.
    pub async fn replay(&self) -> Result<Vec<ProgressEvent>, ProgressLogError> {
        let snapshots = self.raw_snapshots().await?;

        let mut order: Vec<Uuid> = Vec::new();
        let mut latest: HashMap<Uuid, ProgressEvent> = HashMap::new();

        for event in snapshots {
            if !latest.contains_key(&event.id) {
                order.push(event.id);
            }
            latest.insert(event.id, event);
        }

        Ok(order
            .into_iter()
            .filter_map(|id| latest.remove(&id))
            .collect())
    }

    /// List all run IDs under the runs directory
    pub async fn list_runs() -> anyhow::Result<Vec<Uuid>> {
        let base_dir = crate::config::runs_dir()?;

        if !base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        let mut entries = fs::read_dir(&base_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Ok(uuid) = Uuid::parse_str(name) {
                        runs.push(uuid);
                    }
                }
            }
        }

        Ok(runs)
    }
}

#[async_trait]
impl ProgressStore for ProgressLog {
    async fn append(&self, event: &ProgressEvent) -> Result<(), ProgressLogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)
            .await?;

        let json = serde_json::to_string(event)?;
        file.write_all(format!("{}\n", json).as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
