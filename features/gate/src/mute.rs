//! Administrator-issued mute windows.
//!
//! A session stays muted until its expiry instant. Expired entries are not
//! swept in the background; the first read that observes `now >= expiry`
//! removes the entry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

/// Maps session ids to the instant their mute ends.
#[derive(Debug, Default)]
pub struct MuteRegistry {
    /// Reads may delete expired entries, so a plain `Mutex` rather than `RwLock`.
    muted_until: Mutex<HashMap<String, f64>>,
}

impl MuteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the session is muted at `now`, dropping the entry if it has expired.
    pub fn is_muted(&self, session_id: &str, now: f64) -> bool {
        self.live_expiry(session_id, now).is_some()
    }

    /// Mutes the session for `duration` starting at `now`.
    ///
    /// Overwrites any existing mute. Returns the new expiry instant.
    pub fn mute(&self, session_id: &str, now: f64, duration: Duration) -> f64 {
        let until = now + duration.as_secs_f64();
        match self.muted_until.lock() {
            Ok(mut entries) => {
                entries.insert(session_id.to_string(), until);
            }
            Err(_) => warn!(session_id, "Mute registry lock poisoned, mute dropped"),
        }
        until
    }

    /// Removes the session's mute. Returns `false` if it was not muted.
    pub fn unmute(&self, session_id: &str) -> bool {
        self.muted_until
            .lock()
            .map(|mut entries| entries.remove(session_id).is_some())
            .unwrap_or(false)
    }

    /// Time left on the session's mute, or `None` if it is not muted at `now`.
    pub fn remaining_time(&self, session_id: &str, now: f64) -> Option<Duration> {
        self.live_expiry(session_id, now)
            .map(|until| Duration::try_from_secs_f64(until - now).unwrap_or(Duration::MAX))
    }

    /// Stored expiry instant, without checking whether it has passed.
    pub fn expiry_instant(&self, session_id: &str) -> Option<f64> {
        self.muted_until
            .lock()
            .ok()
            .and_then(|entries| entries.get(session_id).copied())
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.muted_until.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the stored entries for persistence.
    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.muted_until
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Replaces all entries with `entries`.
    pub fn restore(&self, entries: HashMap<String, f64>) {
        if let Ok(mut current) = self.muted_until.lock() {
            *current = entries;
        }
    }

    /// Returns the expiry if the mute is still live, removing it otherwise.
    fn live_expiry(&self, session_id: &str, now: f64) -> Option<f64> {
        let Ok(mut entries) = self.muted_until.lock() else {
            warn!(session_id, "Mute registry lock poisoned, treating as unmuted");
            return None;
        };
        let until = *entries.get(session_id)?;
        if now < until {
            return Some(until);
        }
        entries.remove(session_id);
        debug!(session_id, until, "Mute expired");
        None
    }
}

#[cfg(test)]
#[path = "mute.test.rs"]
mod tests;
