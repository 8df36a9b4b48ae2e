//! Gate configuration.
//!
//! Loaded from a JSON document shaped like:
//!
//! ```json
//! {
//!   "persistence": { "enabled": true, "path": "data/llm_mute/data.json" },
//!   "mute_command": { "enabled": true, "default_duration": 3600 },
//!   "llm_interval": { "interval": 0 }
//! }
//! ```
//!
//! Every section and field is optional and falls back to its default.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;
use tracing::debug;

use crate::error::Result;
use crate::error::gate_error::ParseConfigSnafu;
use crate::error::gate_error::ReadConfigSnafu;

/// Where the snapshot lives unless configured otherwise.
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/llm_mute/data.json";

/// Top-level gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMuteConfig {
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub mute_command: MuteCommandConfig,
    #[serde(default)]
    pub llm_interval: LlmIntervalConfig,
}

impl LlmMuteConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context(ParseConfigSnafu)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
        let config = Self::from_json_str(&content)?;
        debug!(path = %path.display(), "Loaded gate config");
        Ok(config)
    }
}

/// Snapshot persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Load the snapshot on startup and save it after every change.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Snapshot file location.
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_snapshot_path(),
        }
    }
}

/// Administrator mute/unmute commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteCommandConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds to mute for when the command gives no duration.
    #[serde(default = "default_mute_duration")]
    pub default_duration: u64,
}

impl MuteCommandConfig {
    pub fn default_duration(&self) -> Duration {
        Duration::from_secs(self.default_duration)
    }
}

impl Default for MuteCommandConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            default_duration: default_mute_duration(),
        }
    }
}

/// Minimum spacing between a completed generation and the next request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmIntervalConfig {
    /// Seconds; `0` disables throttling.
    #[serde(default)]
    pub interval: u64,
}

impl LlmIntervalConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_PATH)
}

fn default_mute_duration() -> u64 {
    3600
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
