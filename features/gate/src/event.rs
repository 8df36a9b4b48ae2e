//! Inputs the host hands to the gate.

use serde::Deserialize;
use serde::Serialize;

/// An outgoing LLM request about to be dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub session_id: String,
    /// Epoch seconds at which the triggering message was received.
    ///
    /// Cooldown is measured against this rather than the gate's clock so that
    /// late event delivery does not shorten the interval.
    pub timestamp: f64,
}

impl LlmRequest {
    pub fn new(session_id: impl Into<String>, timestamp: f64) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp,
        }
    }
}

/// A completed LLM response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub session_id: String,
}

impl LlmResponse {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// Caller of an administrative command, as resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContext {
    pub session_id: String,
    pub is_admin: bool,
}

impl CommandContext {
    pub fn new(session_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            session_id: session_id.into(),
            is_admin,
        }
    }

    pub fn admin(session_id: impl Into<String>) -> Self {
        Self::new(session_id, true)
    }
}
