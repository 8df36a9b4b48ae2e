use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_mute_window_scenario() {
    let registry = MuteRegistry::new();

    let until = registry.mute("sid1", 1000.0, Duration::from_secs(60));
    assert_eq!(until, 1060.0);

    assert!(registry.is_muted("sid1", 1030.0));
    assert_eq!(
        registry.remaining_time("sid1", 1030.0),
        Some(Duration::from_secs(30))
    );
    assert!(!registry.is_muted("sid1", 1060.0));
}

#[test]
fn test_mute_window_boundaries() {
    for secs in [0_u64, 1, 59, 3600] {
        let registry = MuteRegistry::new();
        let start = 500.0;
        registry.mute("s", start, Duration::from_secs(secs));
        let end = start + secs as f64;

        if secs > 0 {
            assert!(registry.is_muted("s", start), "muted at start for {secs}s");
            assert!(registry.is_muted("s", end - 0.5), "muted before end for {secs}s");
        }
        assert!(!registry.is_muted("s", end), "unmuted at end for {secs}s");
        assert!(!registry.is_muted("s", end + 1.0));
    }
}

#[test]
fn test_expired_entry_is_removed_on_read() {
    let registry = MuteRegistry::new();
    registry.mute("s", 0.0, Duration::from_secs(10));
    assert_eq!(registry.len(), 1);

    assert!(!registry.is_muted("s", 10.0));
    assert!(registry.is_empty());
    assert_eq!(registry.remaining_time("s", 10.0), None);
    assert_eq!(registry.expiry_instant("s"), None);
}

#[test]
fn test_remaining_time_expires_lazily_too() {
    let registry = MuteRegistry::new();
    registry.mute("s", 0.0, Duration::from_secs(10));

    assert_eq!(registry.remaining_time("s", 11.0), None);
    assert!(registry.is_empty());
}

#[test]
fn test_mute_overwrites_instead_of_stacking() {
    let registry = MuteRegistry::new();
    registry.mute("s", 0.0, Duration::from_secs(100));
    registry.mute("s", 10.0, Duration::from_secs(5));

    assert_eq!(registry.expiry_instant("s"), Some(15.0));
    assert!(!registry.is_muted("s", 20.0));
}

#[test]
fn test_unmute() {
    let registry = MuteRegistry::new();
    assert!(!registry.unmute("sid1"));

    registry.mute("sid1", 1000.0, Duration::from_secs(60));
    assert!(registry.unmute("sid1"));
    assert!(!registry.is_muted("sid1", 1001.0));
    assert!(!registry.unmute("sid1"));
}

#[test]
fn test_sessions_are_independent() {
    let registry = MuteRegistry::new();
    registry.mute("a", 0.0, Duration::from_secs(60));

    assert!(registry.is_muted("a", 1.0));
    assert!(!registry.is_muted("b", 1.0));
}

#[test]
fn test_snapshot_and_restore() {
    let registry = MuteRegistry::new();
    registry.mute("a", 0.0, Duration::from_secs(60));

    let restored = MuteRegistry::new();
    restored.restore(registry.snapshot());
    assert_eq!(restored.expiry_instant("a"), Some(60.0));
}

fn poison(registry: &MuteRegistry) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = registry.muted_until.lock().unwrap();
        panic!("holder panicked");
    }));
    assert!(result.is_err());
    assert!(registry.muted_until.is_poisoned());
}

#[test]
fn test_poisoned_lock_reads_as_unmuted() {
    let registry = MuteRegistry::new();
    registry.mute("s", 1000.0, Duration::from_secs(60));
    poison(&registry);

    assert!(!registry.is_muted("s", 1030.0));
    assert_eq!(registry.remaining_time("s", 1030.0), None);
    assert_eq!(registry.expiry_instant("s"), None);
    assert!(!registry.unmute("s"));
    assert!(registry.snapshot().is_empty());
}

#[test]
fn test_poisoned_lock_skips_writes() {
    let registry = MuteRegistry::new();
    poison(&registry);

    assert_eq!(registry.mute("s", 1000.0, Duration::from_secs(5)), 1005.0);
    registry.restore(HashMap::from([("t".to_string(), 2000.0)]));

    assert!(!registry.is_muted("s", 1001.0));
    assert!(!registry.is_muted("t", 1001.0));
    assert_eq!(registry.len(), 0);
}
