//! Sessions with a generation currently running.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::warn;

/// Set of sessions between admission and response completion.
///
/// Never persisted: a restart starts with nothing in flight.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    sessions: Mutex<HashSet<String>>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the session in flight. Returns `false` if it already was.
    ///
    /// Check and insert happen under one lock, so racing callers for the same
    /// session cannot both succeed.
    pub fn try_begin(&self, session_id: &str) -> bool {
        match self.sessions.lock() {
            Ok(mut sessions) => sessions.insert(session_id.to_string()),
            Err(_) => {
                warn!(session_id, "In-flight lock poisoned, refusing admission");
                false
            }
        }
    }

    /// Clears the in-flight mark. Returns whether the session was marked.
    pub fn end(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .map(|mut sessions| sessions.remove(session_id))
            .unwrap_or(false)
    }

    pub fn is_in_flight(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .map(|sessions| sessions.contains(session_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "in_flight.test.rs"]
mod tests;
