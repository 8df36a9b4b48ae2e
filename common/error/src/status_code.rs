//! Status codes for error classification.
//!
//! Format: XX_YYY (5-digit), XX = category, YYY = code within category.
//!
//! - 03_xxx: IO/storage (snapshot files)
//! - 10_xxx: Configuration
//! - 12_xxx: Admission/resource limits

use strum::AsRefStr;

/// Status codes used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[repr(i32)]
pub enum StatusCode {
    /// IO error.
    IoError = 03_000,
    /// Serialization of persisted state failed.
    SerializeError = 03_002,

    /// Invalid configuration.
    InvalidConfig = 10_000,
    /// Config file could not be read.
    ConfigFileError = 10_001,

    /// Session is muted by an administrator.
    Muted = 12_000,
    /// Minimum request interval not yet elapsed.
    RateLimited = 12_001,
    /// A generation is already running for the session.
    Busy = 12_002,
}

impl StatusCode {
    /// Returns true if retrying later can succeed without operator action.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Busy)
    }

    /// Returns true if the error should be logged at error level.
    pub const fn should_log_error(&self) -> bool {
        matches!(self, Self::IoError | Self::SerializeError)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[cfg(test)]
#[path = "status_code.test.rs"]
mod tests;
