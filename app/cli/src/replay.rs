//! JSON-lines replay of host events.
//!
//! Each input line is one event:
//!
//! ```text
//! {"type":"request","session_id":"g1","timestamp":1700000000.0}
//! {"type":"response","session_id":"g1"}
//! {"type":"mute","session_id":"g1","duration":600,"is_admin":true}
//! {"type":"unmute","session_id":"g1","is_admin":true}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Each handled event
//! prints one JSON line, except commands the gate silently drops.

use std::io::BufRead;
use std::io::Write;

use llm_mute_gate::CommandContext;
use llm_mute_gate::LlmMuteGate;
use llm_mute_gate::LlmRequest;
use llm_mute_gate::LlmResponse;
use llm_mute_gate::RejectReason;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

/// An event as the host would deliver it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Request {
        session_id: String,
        /// Defaults to the gate clock when absent.
        #[serde(default)]
        timestamp: Option<f64>,
    },
    Response {
        session_id: String,
    },
    Mute {
        session_id: String,
        #[serde(default)]
        duration: Option<u64>,
        #[serde(default)]
        is_admin: bool,
    },
    Unmute {
        session_id: String,
        #[serde(default)]
        is_admin: bool,
    },
}

/// What the gate answered for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayOutput {
    Request {
        session_id: String,
        admitted: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<RejectReason>,
        /// Numeric [`llm_mute_error::StatusCode`] of the rejection.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<i32>,
        /// Whether the same request can succeed later without an admin.
        #[serde(skip_serializing_if = "Option::is_none")]
        retryable: Option<bool>,
    },
    Response {
        session_id: String,
    },
    Mute {
        session_id: String,
        muted_until: f64,
        remaining_secs: u64,
        message: String,
    },
    Unmute {
        session_id: String,
        message: String,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub events: usize,
    pub skipped: usize,
}

/// Feeds one event to the gate.
pub fn apply(gate: &LlmMuteGate, event: HostEvent) -> Option<ReplayOutput> {
    match event {
        HostEvent::Request {
            session_id,
            timestamp,
        } => {
            let timestamp = timestamp.unwrap_or_else(|| gate.now());
            let admission = gate.on_request(&LlmRequest::new(session_id.clone(), timestamp));
            let reason = admission.reject_reason();
            let status_code = reason.map(|r| r.status_code());
            Some(ReplayOutput::Request {
                session_id,
                admitted: admission.is_admitted(),
                reason,
                status_code: status_code.map(|code| code as i32),
                retryable: status_code.map(|code| code.is_retryable()),
            })
        }
        HostEvent::Response { session_id } => {
            gate.on_response(&LlmResponse::new(session_id.clone()));
            Some(ReplayOutput::Response { session_id })
        }
        HostEvent::Mute {
            session_id,
            duration,
            is_admin,
        } => {
            let receipt = gate.mute_command(&CommandContext::new(session_id, is_admin), duration)?;
            Some(ReplayOutput::Mute {
                message: receipt.message(),
                remaining_secs: receipt.remaining.as_secs(),
                muted_until: receipt.muted_until,
                session_id: receipt.session_id,
            })
        }
        HostEvent::Unmute {
            session_id,
            is_admin,
        } => {
            let receipt = gate.unmute_command(&CommandContext::new(session_id, is_admin))?;
            Some(ReplayOutput::Unmute {
                message: receipt.message(),
                session_id: receipt.session_id,
            })
        }
    }
}

/// Replays every event in `input`, writing replies to `output`.
///
/// Malformed lines are logged and skipped; IO errors abort the replay.
pub fn replay<R, W>(gate: &LlmMuteGate, input: R, output: &mut W) -> anyhow::Result<ReplayStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = ReplayStats::default();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event = match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping malformed event");
                stats.skipped += 1;
                continue;
            }
        };
        stats.events += 1;

        if let Some(reply) = apply(gate, event) {
            serde_json::to_writer(&mut *output, &reply)?;
            writeln!(output)?;
        }
    }
    output.flush()?;
    Ok(stats)
}

#[cfg(test)]
#[path = "replay.test.rs"]
mod tests;
