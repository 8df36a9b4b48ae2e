use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_manual_clock_set_and_advance() {
    let clock = ManualClock::new(1000.0);
    assert_eq!(clock.now(), 1000.0);

    clock.advance(Duration::from_millis(1500));
    assert_eq!(clock.now(), 1001.5);

    clock.set(42.0);
    assert_eq!(clock.now(), 42.0);
}

#[test]
fn test_default_manual_clock_starts_at_epoch() {
    assert_eq!(ManualClock::default().now(), 0.0);
}

#[test]
fn test_system_clock_is_past_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now() > 1_577_836_800.0);
}
