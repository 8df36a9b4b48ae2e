//! The admission gate.
//!
//! Requests are checked in a fixed order and the first failing check wins:
//!
//! 1. muted (against the gate clock)
//! 2. cooldown (against the request's own timestamp)
//! 3. already generating
//!
//! Responses end the in-flight mark and start the cooldown. Mute, unmute and
//! completion changes are handed to the snapshot writer when persistence is on.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::config::LlmMuteConfig;
use crate::decision::Admission;
use crate::decision::MuteReceipt;
use crate::decision::RejectReason;
use crate::decision::UnmuteReceipt;
use crate::event::CommandContext;
use crate::event::LlmRequest;
use crate::event::LlmResponse;
use crate::format::format_duration;
use crate::format::format_timestamp;
use crate::in_flight::InFlightTracker;
use crate::mute::MuteRegistry;
use crate::snapshot::Snapshot;
use crate::snapshot::SnapshotStore;
use crate::snapshot::SnapshotWriter;
use crate::snapshot::log_save_failure;
use crate::throttle::ThrottleRegistry;

/// Per-session admission control for LLM requests.
///
/// Owns all state; nothing is global, so independent gates can coexist.
pub struct LlmMuteGate {
    config: LlmMuteConfig,
    clock: Arc<dyn Clock>,
    mutes: MuteRegistry,
    throttle: ThrottleRegistry,
    in_flight: InFlightTracker,
    /// Present only when persistence is enabled.
    store: Option<SnapshotStore>,
    /// Also serializes snapshot capture so submissions arrive newest-last.
    writer: Mutex<Option<SnapshotWriter>>,
}

impl LlmMuteGate {
    pub fn new(config: LlmMuteConfig, clock: Arc<dyn Clock>) -> Self {
        let store = config
            .persistence
            .enabled
            .then(|| SnapshotStore::new(config.persistence.path.clone()));
        Self {
            config,
            clock,
            mutes: MuteRegistry::new(),
            throttle: ThrottleRegistry::new(),
            in_flight: InFlightTracker::new(),
            store,
            writer: Mutex::new(None),
        }
    }

    pub fn with_system_clock(config: LlmMuteConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &LlmMuteConfig {
        &self.config
    }

    /// Current time according to the gate's clock.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Restores persisted state and starts the snapshot writer.
    ///
    /// No-op when persistence is disabled or the gate is already initialized.
    pub async fn initialize(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let Ok(mut writer) = self.writer.lock() else {
            warn!("Snapshot writer lock poisoned, persistence disabled");
            return;
        };
        if writer.is_some() {
            warn!("LLM mute gate already initialized");
            return;
        }

        let snapshot = store.load();
        self.mutes.restore(snapshot.muted_until);
        self.throttle.restore(snapshot.last_generated);
        *writer = Some(SnapshotWriter::spawn(store.clone()));
    }

    /// Stops the snapshot writer and saves the final state.
    ///
    /// Does nothing unless [`Self::initialize`] started the writer, so a gate
    /// that never loaded the snapshot cannot overwrite it.
    pub async fn shutdown(&self) {
        let Some(writer) = self.writer.lock().ok().and_then(|mut w| w.take()) else {
            debug!("LLM mute gate not initialized, skipping final save");
            return;
        };
        writer.close().await;

        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.snapshot()) {
            log_save_failure(store.path(), &e);
        }
    }

    /// Decides whether an LLM request may proceed.
    ///
    /// On [`Admission::Admit`] the session is marked in flight; the host must
    /// call [`Self::on_response`] once the generation finishes.
    pub fn on_request(&self, request: &LlmRequest) -> Admission {
        let session_id = request.session_id.as_str();
        let now = self.clock.now();

        if let Some(remaining) = self.mutes.remaining_time(session_id, now) {
            info!(
                session_id,
                remaining = %format_duration(remaining),
                status_code = %RejectReason::Muted.status_code(),
                "LLM muted, ignoring request"
            );
            return Admission::Reject(RejectReason::Muted);
        }

        let min_interval = self.config.llm_interval.min_interval();
        debug!(
            session_id,
            request_ts = request.timestamp,
            last_generated = ?self.throttle.last_generated(session_id),
            "Checking request interval"
        );
        if self
            .throttle
            .is_within_cooldown(session_id, request.timestamp, min_interval)
        {
            info!(
                session_id,
                status_code = %RejectReason::Cooldown.status_code(),
                "LLM request interval too short, ignoring request"
            );
            return Admission::Reject(RejectReason::Cooldown);
        }

        if !self.in_flight.try_begin(session_id) {
            info!(
                session_id,
                status_code = %RejectReason::AlreadyGenerating.status_code(),
                "LLM already generating, ignoring request"
            );
            return Admission::Reject(RejectReason::AlreadyGenerating);
        }

        debug!(session_id, "LLM request admitted");
        Admission::Admit
    }

    /// Records a finished generation.
    ///
    /// Tolerates responses with no matching admission.
    pub fn on_response(&self, response: &LlmResponse) {
        let session_id = response.session_id.as_str();
        if !self.in_flight.end(session_id) {
            debug!(session_id, "LLM response without a matching admission");
        }
        self.throttle.record_completion(session_id, self.clock.now());
        self.persist();
    }

    /// Mutes the caller's session.
    ///
    /// Returns `None` when mute commands are disabled or the caller is not an
    /// administrator; nothing is replied in that case.
    pub fn mute_command(
        &self,
        ctx: &CommandContext,
        duration_secs: Option<u64>,
    ) -> Option<MuteReceipt> {
        if !self.command_allowed(ctx) {
            return None;
        }

        let duration = duration_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.mute_command.default_duration());
        let now = self.clock.now();
        let muted_until = self.mutes.mute(&ctx.session_id, now, duration);
        info!(
            session_id = %ctx.session_id,
            duration = %format_duration(duration),
            until = %format_timestamp(muted_until),
            "LLM muted"
        );
        self.persist();

        Some(MuteReceipt {
            session_id: ctx.session_id.clone(),
            remaining: duration,
            muted_until,
        })
    }

    /// Lifts the caller's session mute.
    ///
    /// Returns `None` when disabled, unauthorized, or the session was not muted.
    pub fn unmute_command(&self, ctx: &CommandContext) -> Option<UnmuteReceipt> {
        if !self.command_allowed(ctx) || !self.mutes.unmute(&ctx.session_id) {
            return None;
        }

        info!(session_id = %ctx.session_id, "LLM unmuted");
        self.persist();

        Some(UnmuteReceipt {
            session_id: ctx.session_id.clone(),
        })
    }

    /// Time left on the session's mute, `None` if not muted.
    pub fn remaining_mute(&self, session_id: &str) -> Option<Duration> {
        self.mutes.remaining_time(session_id, self.clock.now())
    }

    /// Epoch seconds at which the session's mute ends, `None` if not muted.
    pub fn muted_until(&self, session_id: &str) -> Option<f64> {
        if !self.mutes.is_muted(session_id, self.clock.now()) {
            return None;
        }
        self.mutes.expiry_instant(session_id)
    }

    pub fn last_generated(&self, session_id: &str) -> Option<f64> {
        self.throttle.last_generated(session_id)
    }

    pub fn is_in_flight(&self, session_id: &str) -> bool {
        self.in_flight.is_in_flight(session_id)
    }

    /// Current persistable state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.mutes.snapshot(), self.throttle.snapshot())
    }

    fn command_allowed(&self, ctx: &CommandContext) -> bool {
        if !self.config.mute_command.enabled {
            debug!(session_id = %ctx.session_id, "Mute commands disabled, ignoring");
            return false;
        }
        if !ctx.is_admin {
            debug!(session_id = %ctx.session_id, "Mute command from non-admin, ignoring");
            return false;
        }
        true
    }

    fn persist(&self) {
        let Ok(writer) = self.writer.lock() else {
            return;
        };
        if let Some(writer) = writer.as_ref() {
            writer.submit(self.snapshot());
        }
    }
}

impl std::fmt::Debug for LlmMuteGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmMuteGate")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("muted", &self.mutes.len())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "gate.test.rs"]
mod tests;
