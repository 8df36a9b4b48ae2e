//! Durable snapshot of mute and throttle state.
//!
//! The snapshot is one JSON file:
//!
//! ```json
//! {
//!   "version": 1,
//!   "muted_until": { "<session>": 1700000000.5 },
//!   "last_generated": { "<session>": 1699999990.0 }
//! }
//! ```
//!
//! Files written before `version` existed load as version 0. In-flight
//! sessions are never part of the snapshot.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use llm_mute_error::ErrorExt;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use snafu::ResultExt;
use tempfile::NamedTempFile;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::error::GateError;
use crate::error::Result;
use crate::error::gate_error::CreateDirSnafu;
use crate::error::gate_error::SerializeSnapshotSnafu;
use crate::error::gate_error::WriteSnapshotSnafu;

/// Snapshot schema version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted gate state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub version: u32,
    /// Session id to mute expiry, epoch seconds.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub muted_until: HashMap<String, f64>,
    /// Session id to last completed generation, epoch seconds.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_generated: HashMap<String, f64>,
}

impl Snapshot {
    pub fn new(muted_until: HashMap<String, f64>, last_generated: HashMap<String, f64>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            muted_until,
            last_generated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.muted_until.is_empty() && self.last_generated.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<HashMap<String, f64>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Reads and writes the snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot. Returns empty state if the file is missing or unusable.
    pub fn load(&self) -> Snapshot {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No snapshot file, starting empty");
            return Snapshot::default();
        }

        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Snapshot>(&content) {
                Ok(snapshot) => {
                    info!(
                        path = %self.path.display(),
                        version = snapshot.version,
                        muted = snapshot.muted_until.len(),
                        last_generated = snapshot.last_generated.len(),
                        "Loaded LLM mute snapshot"
                    );
                    snapshot
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Corrupted LLM mute snapshot, starting empty"
                    );
                    Snapshot::default()
                }
            },
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read LLM mute snapshot, starting empty"
                );
                Snapshot::default()
            }
        }
    }

    /// Writes the snapshot, replacing the previous file atomically.
    ///
    /// The content goes to a temporary file next to the target which is then
    /// renamed over it, so a failed write leaves the old snapshot intact.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).context(CreateDirSnafu { path: parent })?;

        let content = serde_json::to_vec_pretty(snapshot).context(SerializeSnapshotSnafu)?;

        let mut tmp = NamedTempFile::new_in(parent).context(WriteSnapshotSnafu { path: parent })?;
        tmp.write_all(&content)
            .context(WriteSnapshotSnafu { path: tmp.path() })?;
        tmp.as_file()
            .sync_all()
            .context(WriteSnapshotSnafu { path: tmp.path() })?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .context(WriteSnapshotSnafu { path: &self.path })?;

        debug!(path = %self.path.display(), "Saved LLM mute snapshot");
        Ok(())
    }
}

/// Background task that writes snapshots off the request path.
///
/// Submissions replace any snapshot not yet written, so a burst of changes
/// costs one write and the newest state always lands last.
#[derive(Debug)]
pub struct SnapshotWriter {
    tx: watch::Sender<Option<Snapshot>>,
    handle: JoinHandle<()>,
}

impl SnapshotWriter {
    /// Spawns the writer on the current tokio runtime.
    pub fn spawn(store: SnapshotStore) -> Self {
        let (tx, mut rx) = watch::channel(None::<Snapshot>);
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let latest = rx.borrow_and_update().clone();
                let Some(snapshot) = latest else {
                    continue;
                };
                let task_store = store.clone();
                match tokio::task::spawn_blocking(move || task_store.save(&snapshot)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => log_save_failure(store.path(), &e),
                    Err(e) => error!(error = %e, "LLM mute snapshot task panicked"),
                }
            }
        });
        Self { tx, handle }
    }

    /// Queues `snapshot` for writing. Never blocks.
    pub fn submit(&self, snapshot: Snapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    /// Writes any queued snapshot and stops the task.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            error!(error = %e, "LLM mute snapshot writer ended abnormally");
        }
    }
}

/// Logs a failed save at the level its status code calls for.
pub(crate) fn log_save_failure(path: &Path, e: &GateError) {
    let status_code = e.status_code();
    if status_code.should_log_error() {
        error!(path = %path.display(), %status_code, error = %e, "LLM mute snapshot save failed");
    } else {
        warn!(path = %path.display(), %status_code, error = %e, "LLM mute snapshot save failed");
    }
}

#[cfg(test)]
#[path = "snapshot.test.rs"]
mod tests;
