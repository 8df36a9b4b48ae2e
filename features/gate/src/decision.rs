//! Outcomes returned to the host.

use std::time::Duration;

use llm_mute_error::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use crate::format::format_duration;
use crate::format::format_timestamp;

/// Whether an LLM request may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Admission {
    /// Proceed; the session is now in flight until its response completes.
    Admit,
    /// Stop the event; the host must not call the LLM.
    Reject(RejectReason),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit)
    }

    /// True when the host should stop processing the event.
    pub fn should_stop(&self) -> bool {
        !self.is_admitted()
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Admit => None,
            Self::Reject(reason) => Some(*reason),
        }
    }
}

/// Why a request was rejected, in check order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    /// An administrator muted the session.
    Muted,
    /// The minimum interval since the last completion has not elapsed.
    Cooldown,
    /// A generation for the session is still running.
    AlreadyGenerating,
}

impl RejectReason {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Muted => StatusCode::Muted,
            Self::Cooldown => StatusCode::RateLimited,
            Self::AlreadyGenerating => StatusCode::Busy,
        }
    }
}

/// Reply to a successful mute command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuteReceipt {
    pub session_id: String,
    pub remaining: Duration,
    /// Epoch seconds at which the mute ends.
    pub muted_until: f64,
}

impl MuteReceipt {
    /// Confirmation text for the administrator.
    pub fn message(&self) -> String {
        format!(
            "LLM muted for {}\nUnmute at: {}",
            format_duration(self.remaining),
            format_timestamp(self.muted_until)
        )
    }
}

/// Reply to an unmute command that removed a mute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmuteReceipt {
    pub session_id: String,
}

impl UnmuteReceipt {
    pub fn message(&self) -> String {
        "LLM unmuted".to_string()
    }
}

#[cfg(test)]
#[path = "decision.test.rs"]
mod tests;
