//! Error types for the admission gate.
//!
//! None of these reach the admission path: configuration errors surface when
//! the host builds the gate, snapshot errors are logged by the writer.

use std::path::PathBuf;

use llm_mute_error::ErrorExt;
use llm_mute_error::Location;
use llm_mute_error::StatusCode;
use snafu::Snafu;

/// Gate errors.
///
/// Use the context selectors from `gate_error` within the crate:
/// ```ignore
/// use crate::error::gate_error::*;
/// use snafu::ResultExt;
///
/// std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
/// ```
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum GateError {
    /// Config file could not be read.
    #[snafu(display("Failed to read config {}: {source}", path.display()))]
    ReadConfig {
        path: PathBuf,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Config file is not valid JSON for [`crate::LlmMuteConfig`].
    #[snafu(display("Invalid config: {source}"))]
    ParseConfig {
        #[snafu(source)]
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Snapshot directory could not be created.
    #[snafu(display("Failed to create snapshot directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to serialize snapshot: {source}"))]
    SerializeSnapshot {
        #[snafu(source)]
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Writing or replacing the snapshot file failed.
    #[snafu(display("Failed to write snapshot {}: {source}", path.display()))]
    WriteSnapshot {
        path: PathBuf,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for GateError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ReadConfig { .. } => StatusCode::ConfigFileError,
            Self::ParseConfig { .. } => StatusCode::InvalidConfig,
            Self::CreateDir { .. } | Self::WriteSnapshot { .. } => StatusCode::IoError,
            Self::SerializeSnapshot { .. } => StatusCode::SerializeError,
        }
    }
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
