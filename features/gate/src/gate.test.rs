use std::path::Path;
use std::sync::Barrier;
use std::thread;

use super::*;
use crate::clock::ManualClock;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const NOW: f64 = 1000.0;

fn config(interval: u64) -> LlmMuteConfig {
    let mut config = LlmMuteConfig::default();
    config.persistence.enabled = false;
    config.llm_interval.interval = interval;
    config
}

fn persistent_config(path: &Path, interval: u64) -> LlmMuteConfig {
    let mut config = config(interval);
    config.persistence.enabled = true;
    config.persistence.path = path.to_path_buf();
    config
}

fn gate(config: LlmMuteConfig) -> (LlmMuteGate, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW));
    let gate = LlmMuteGate::new(config, clock.clone());
    (gate, clock)
}

fn request(session_id: &str, timestamp: f64) -> LlmRequest {
    LlmRequest::new(session_id, timestamp)
}

fn response(session_id: &str) -> LlmResponse {
    LlmResponse::new(session_id)
}

#[test]
fn test_admit_then_dedup_until_response() {
    let (gate, _clock) = gate(config(0));

    assert_eq!(gate.on_request(&request("s", NOW)), Admission::Admit);
    assert!(gate.is_in_flight("s"));
    assert_eq!(
        gate.on_request(&request("s", NOW)),
        Admission::Reject(RejectReason::AlreadyGenerating)
    );

    gate.on_response(&response("s"));
    assert!(!gate.is_in_flight("s"));
    assert_eq!(gate.last_generated("s"), Some(NOW));
    assert_eq!(gate.on_request(&request("s", NOW)), Admission::Admit);
}

#[test]
fn test_cooldown_measured_from_request_timestamp() {
    let (gate, clock) = gate(config(10));

    assert!(gate.on_request(&request("s", NOW)).is_admitted());
    gate.on_response(&response("s"));

    // Wall clock has moved on, but the request itself was sent 5s after completion.
    clock.advance(Duration::from_secs(100));
    assert_eq!(
        gate.on_request(&request("s", NOW + 5.0)),
        Admission::Reject(RejectReason::Cooldown)
    );
    assert!(!gate.is_in_flight("s"));

    assert_eq!(gate.on_request(&request("s", NOW + 10.0)), Admission::Admit);
}

#[test]
fn test_mute_takes_priority_over_cooldown() {
    let (gate, _clock) = gate(config(60));
    gate.on_response(&response("s"));
    gate.mute_command(&CommandContext::admin("s"), Some(60));

    assert_eq!(
        gate.on_request(&request("s", NOW + 1.0)),
        Admission::Reject(RejectReason::Muted)
    );
}

#[test]
fn test_cooldown_takes_priority_over_in_flight() {
    let (gate, _clock) = gate(config(10));
    gate.on_response(&response("s"));

    assert!(gate.on_request(&request("s", NOW + 20.0)).is_admitted());
    // A delayed event older than the last completion.
    assert_eq!(
        gate.on_request(&request("s", NOW - 5.0)),
        Admission::Reject(RejectReason::Cooldown)
    );
}

#[test]
fn test_muted_request_leaves_other_state_untouched() {
    let (gate, _clock) = gate(config(0));
    gate.mute_command(&CommandContext::admin("s"), Some(60));

    assert_eq!(
        gate.on_request(&request("s", NOW)),
        Admission::Reject(RejectReason::Muted)
    );
    assert!(!gate.is_in_flight("s"));
    assert_eq!(gate.last_generated("s"), None);
}

#[test]
fn test_mute_scenario() {
    let (gate, clock) = gate(config(0));

    let receipt = gate
        .mute_command(&CommandContext::admin("sid1"), Some(60))
        .unwrap();
    assert_eq!(receipt.remaining, Duration::from_secs(60));
    assert_eq!(receipt.muted_until, 1060.0);

    clock.advance(Duration::from_secs(30));
    assert_eq!(gate.remaining_mute("sid1"), Some(Duration::from_secs(30)));
    assert_eq!(gate.muted_until("sid1"), Some(1060.0));
    assert!(gate.on_request(&request("sid1", 1030.0)).should_stop());

    clock.advance(Duration::from_secs(30));
    assert_eq!(gate.remaining_mute("sid1"), None);
    assert_eq!(gate.muted_until("sid1"), None);
    assert_eq!(gate.on_request(&request("sid1", 1060.0)), Admission::Admit);
}

#[test]
fn test_mute_uses_default_duration() {
    let mut config = config(0);
    config.mute_command.default_duration = 120;
    let (gate, _clock) = gate(config);

    let receipt = gate.mute_command(&CommandContext::admin("s"), None).unwrap();
    assert_eq!(receipt.remaining, Duration::from_secs(120));
    assert_eq!(receipt.muted_until, NOW + 120.0);
}

#[test]
fn test_remute_overwrites() {
    let (gate, _clock) = gate(config(0));
    gate.mute_command(&CommandContext::admin("s"), Some(3600));
    gate.mute_command(&CommandContext::admin("s"), Some(5));

    assert_eq!(gate.muted_until("s"), Some(NOW + 5.0));
}

#[test]
fn test_commands_ignored_for_non_admin() {
    let (gate, _clock) = gate(config(0));
    let ctx = CommandContext::new("s", false);

    assert_eq!(gate.mute_command(&ctx, Some(60)), None);
    assert_eq!(gate.remaining_mute("s"), None);

    gate.mute_command(&CommandContext::admin("s"), Some(60));
    assert_eq!(gate.unmute_command(&ctx), None);
    assert!(gate.remaining_mute("s").is_some());
}

#[test]
fn test_commands_ignored_when_disabled() {
    let mut config = config(0);
    config.mute_command.enabled = false;
    let (gate, _clock) = gate(config);

    assert_eq!(gate.mute_command(&CommandContext::admin("s"), Some(60)), None);
    assert_eq!(gate.unmute_command(&CommandContext::admin("s")), None);
    assert!(gate.on_request(&request("s", NOW)).is_admitted());
}

#[test]
fn test_unmute_command() {
    let (gate, _clock) = gate(config(0));
    let ctx = CommandContext::admin("s");

    assert_eq!(gate.unmute_command(&ctx), None);

    gate.mute_command(&ctx, Some(60));
    let receipt = gate.unmute_command(&ctx).unwrap();
    assert_eq!(receipt.session_id, "s");
    assert!(gate.on_request(&request("s", NOW)).is_admitted());
    assert_eq!(gate.unmute_command(&ctx), None);
}

#[test]
fn test_response_without_admission_still_starts_cooldown() {
    let (gate, _clock) = gate(config(30));
    gate.on_response(&response("stray"));

    assert!(!gate.is_in_flight("stray"));
    assert_eq!(
        gate.on_request(&request("stray", NOW + 1.0)),
        Admission::Reject(RejectReason::Cooldown)
    );
}

#[test]
fn test_sessions_do_not_interfere() {
    let (gate, _clock) = gate(config(60));
    gate.mute_command(&CommandContext::admin("muted"), Some(60));
    gate.on_response(&response("cooling"));
    assert!(gate.on_request(&request("busy", NOW)).is_admitted());

    assert!(gate.on_request(&request("muted", NOW)).should_stop());
    assert!(gate.on_request(&request("cooling", NOW)).should_stop());
    assert!(gate.on_request(&request("busy", NOW)).should_stop());
    assert!(gate.on_request(&request("fresh", NOW)).is_admitted());
}

#[test]
fn test_gates_are_independent() {
    let (first, _c1) = gate(config(0));
    let (second, _c2) = gate(config(0));

    first.mute_command(&CommandContext::admin("s"), Some(60));
    assert!(first.on_request(&request("s", NOW)).should_stop());
    assert!(second.on_request(&request("s", NOW)).is_admitted());
}

#[test]
fn test_concurrent_requests_admit_once() {
    const THREADS: usize = 12;
    let (gate, _clock) = gate(config(0));
    let gate = Arc::new(gate);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                gate.on_request(&request("s", NOW))
            })
        })
        .collect();

    let decisions: Vec<Admission> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let admitted = decisions.iter().filter(|d| d.is_admitted()).count();
    assert_eq!(admitted, 1);
    assert!(
        decisions
            .iter()
            .filter_map(Admission::reject_reason)
            .all(|r| r == RejectReason::AlreadyGenerating)
    );
}

#[tokio::test]
async fn test_restart_keeps_mute_and_cooldown_but_not_in_flight() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("llm_mute").join("data.json");

    let (before, _clock) = gate(persistent_config(&path, 60));
    before.initialize().await;
    before.mute_command(&CommandContext::admin("x"), Some(600));
    assert!(before.on_request(&request("y", NOW)).is_admitted());
    before.on_response(&response("y"));
    assert!(before.on_request(&request("z", NOW)).is_admitted());
    before.shutdown().await;

    let clock = Arc::new(ManualClock::new(NOW + 10.0));
    let after = LlmMuteGate::new(persistent_config(&path, 60), clock);
    after.initialize().await;

    assert_eq!(after.muted_until("x"), Some(NOW + 600.0));
    assert_eq!(
        after.on_request(&request("x", NOW + 10.0)),
        Admission::Reject(RejectReason::Muted)
    );
    assert_eq!(
        after.on_request(&request("y", NOW + 10.0)),
        Admission::Reject(RejectReason::Cooldown)
    );
    assert!(!after.is_in_flight("z"));
    assert_eq!(after.on_request(&request("z", NOW + 10.0)), Admission::Admit);
    after.shutdown().await;
}

#[tokio::test]
async fn test_changes_are_saved_without_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let (gate, _clock) = gate(persistent_config(&path, 0));
    gate.initialize().await;

    gate.mute_command(&CommandContext::admin("s"), Some(60));

    let store = SnapshotStore::new(&path);
    let mut saved = None;
    for _ in 0..200 {
        saved = store.load().muted_until.get("s").copied();
        if saved.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(saved, Some(NOW + 60.0));

    gate.unmute_command(&CommandContext::admin("s"));
    gate.shutdown().await;
    assert!(store.load().muted_until.is_empty());
}

#[tokio::test]
async fn test_persistence_disabled_touches_no_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let mut config = persistent_config(&path, 0);
    config.persistence.enabled = false;

    let (gate, _clock) = gate(config);
    gate.initialize().await;
    gate.mute_command(&CommandContext::admin("s"), Some(60));
    gate.on_response(&response("s"));
    gate.shutdown().await;

    assert!(!path.exists());
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, r#"{"muted_until": 5}"#).unwrap();

    let (gate, _clock) = gate(persistent_config(&path, 0));
    gate.initialize().await;

    assert!(gate.snapshot().is_empty());
    assert!(gate.on_request(&request("s", NOW)).is_admitted());
    gate.shutdown().await;

    assert!(SnapshotStore::new(&path).load().version > 0);
}

#[tokio::test]
async fn test_expired_mute_in_snapshot_is_dropped_on_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    SnapshotStore::new(&path)
        .save(&Snapshot::new(
            std::collections::HashMap::from([("old".to_string(), NOW - 1.0)]),
            std::collections::HashMap::new(),
        ))
        .unwrap();

    let (gate, _clock) = gate(persistent_config(&path, 0));
    gate.initialize().await;

    assert!(gate.on_request(&request("old", NOW)).is_admitted());
    assert!(gate.snapshot().muted_until.is_empty());
    gate.shutdown().await;
}

fn saved_state(path: &Path) -> Snapshot {
    let store = SnapshotStore::new(path);
    store
        .save(&Snapshot::new(
            std::collections::HashMap::from([("x".to_string(), 9_999_999_999.0)]),
            std::collections::HashMap::from([("y".to_string(), 5.0)]),
        ))
        .unwrap();
    store.load()
}

#[tokio::test]
async fn test_shutdown_without_initialize_keeps_saved_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let before = saved_state(&path);

    let (gate, _clock) = gate(persistent_config(&path, 0));
    gate.shutdown().await;

    assert_eq!(SnapshotStore::new(&path).load(), before);
}

#[tokio::test]
async fn test_poisoned_writer_lock_leaves_saved_state_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let before = saved_state(&path);

    let (gate, _clock) = gate(persistent_config(&path, 0));
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = gate.writer.lock().unwrap();
        panic!("holder panicked");
    }));
    assert!(result.is_err());

    gate.initialize().await;
    assert!(gate.snapshot().is_empty());
    gate.mute_command(&CommandContext::admin("s"), Some(60));
    assert!(gate.on_request(&request("s", NOW)).should_stop());
    gate.shutdown().await;

    assert_eq!(SnapshotStore::new(&path).load(), before);
}
