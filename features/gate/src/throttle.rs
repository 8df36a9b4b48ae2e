//! Minimum spacing between generations of the same session.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Maps session ids to the instant their last generation completed.
///
/// Entries are never removed; an old entry simply lets the next request through.
#[derive(Debug, Default)]
pub struct ThrottleRegistry {
    last_generated: RwLock<HashMap<String, f64>>,
}

impl ThrottleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a generation for the session completed at `now`.
    pub fn record_completion(&self, session_id: &str, now: f64) {
        if let Ok(mut entries) = self.last_generated.write() {
            entries.insert(session_id.to_string(), now);
        }
    }

    pub fn last_generated(&self, session_id: &str) -> Option<f64> {
        self.last_generated
            .read()
            .ok()
            .and_then(|entries| entries.get(session_id).copied())
    }

    /// Seconds between the last completion and `now`.
    ///
    /// `f64::INFINITY` when nothing has completed yet. Negative when `now`
    /// precedes the last completion, which happens for delayed request events.
    pub fn elapsed_since(&self, session_id: &str, now: f64) -> f64 {
        self.last_generated(session_id)
            .map_or(f64::INFINITY, |last| now - last)
    }

    /// Whether fewer than `min_interval` seconds have passed since the last completion.
    pub fn is_within_cooldown(&self, session_id: &str, now: f64, min_interval: Duration) -> bool {
        self.elapsed_since(session_id, now) < min_interval.as_secs_f64()
    }

    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.last_generated
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn restore(&self, entries: HashMap<String, f64>) {
        if let Ok(mut current) = self.last_generated.write() {
            *current = entries;
        }
    }
}

#[cfg(test)]
#[path = "throttle.test.rs"]
mod tests;
