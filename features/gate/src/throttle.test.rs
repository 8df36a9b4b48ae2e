use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_no_prior_completion_is_never_throttled() {
    let registry = ThrottleRegistry::new();
    assert_eq!(registry.elapsed_since("s", 0.0), f64::INFINITY);
    assert!(!registry.is_within_cooldown("s", 0.0, Duration::from_secs(u64::MAX / 2)));
}

#[test]
fn test_cooldown_window() {
    let registry = ThrottleRegistry::new();
    let interval = Duration::from_secs(10);
    registry.record_completion("s", 100.0);

    assert!(registry.is_within_cooldown("s", 100.0, interval));
    assert!(registry.is_within_cooldown("s", 109.9, interval));
    assert!(!registry.is_within_cooldown("s", 110.0, interval));
    assert!(!registry.is_within_cooldown("s", 500.0, interval));
}

#[test]
fn test_zero_interval_only_blocks_requests_older_than_completion() {
    let registry = ThrottleRegistry::new();
    registry.record_completion("s", 100.0);

    assert!(!registry.is_within_cooldown("s", 100.0, Duration::ZERO));
    assert!(registry.is_within_cooldown("s", 99.0, Duration::ZERO));
}

#[test]
fn test_record_completion_overwrites() {
    let registry = ThrottleRegistry::new();
    registry.record_completion("s", 100.0);
    registry.record_completion("s", 200.0);

    assert_eq!(registry.last_generated("s"), Some(200.0));
    assert_eq!(registry.elapsed_since("s", 205.0), 5.0);
}

#[test]
fn test_snapshot_and_restore() {
    let registry = ThrottleRegistry::new();
    registry.record_completion("會話", 1.5);

    let restored = ThrottleRegistry::new();
    restored.restore(registry.snapshot());
    assert_eq!(restored.last_generated("會話"), Some(1.5));
}

#[test]
fn test_poisoned_lock_skips_writes() {
    let registry = ThrottleRegistry::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = registry.last_generated.write().unwrap();
        panic!("holder panicked");
    }));
    assert!(result.is_err());

    registry.record_completion("s", 100.0);
    registry.restore(HashMap::from([("t".to_string(), 100.0)]));

    assert_eq!(registry.last_generated("s"), None);
    assert_eq!(registry.last_generated("t"), None);
    assert!(!registry.is_within_cooldown("s", 101.0, Duration::from_secs(10)));
    assert!(registry.snapshot().is_empty());
}
