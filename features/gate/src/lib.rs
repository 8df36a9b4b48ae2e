//! Admission gate for LLM requests in a conversational bot.
//!
//! For every session the gate decides whether an outgoing LLM request may
//! proceed. A request is rejected while an administrator mute is active,
//! while the minimum interval since the last completed generation has not
//! elapsed, or while a previous generation for the session is still running.
//!
//! Mute and last-generation state survive restarts through a JSON snapshot;
//! the in-flight set is process-local.
//!
//! ```ignore
//! let gate = LlmMuteGate::with_system_clock(config);
//! gate.initialize().await;
//!
//! if gate.on_request(&LlmRequest::new(session_id, msg_ts)).should_stop() {
//!     return;
//! }
//! // ... call the LLM ...
//! gate.on_response(&LlmResponse::new(session_id));
//!
//! gate.shutdown().await;
//! ```

pub mod clock;
pub mod config;
pub mod decision;
pub mod error;
pub mod event;
pub mod format;
pub mod gate;
pub mod in_flight;
pub mod mute;
pub mod snapshot;
pub mod throttle;

pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use config::LlmIntervalConfig;
pub use config::LlmMuteConfig;
pub use config::MuteCommandConfig;
pub use config::PersistenceConfig;
pub use decision::Admission;
pub use decision::MuteReceipt;
pub use decision::RejectReason;
pub use decision::UnmuteReceipt;
pub use error::GateError;
pub use error::Result;
pub use event::CommandContext;
pub use event::LlmRequest;
pub use event::LlmResponse;
pub use gate::LlmMuteGate;
pub use in_flight::InFlightTracker;
pub use mute::MuteRegistry;
pub use snapshot::Snapshot;
pub use snapshot::SnapshotStore;
pub use snapshot::SnapshotWriter;
pub use throttle::ThrottleRegistry;
