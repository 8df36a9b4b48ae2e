use std::sync::Arc;
use std::sync::Barrier;
use std::thread;

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_begin_and_end() {
    let tracker = InFlightTracker::new();

    assert!(tracker.try_begin("s"));
    assert!(tracker.is_in_flight("s"));
    assert!(!tracker.try_begin("s"));

    assert!(tracker.end("s"));
    assert!(!tracker.is_in_flight("s"));
    assert!(tracker.try_begin("s"));
}

#[test]
fn test_end_is_idempotent() {
    let tracker = InFlightTracker::new();
    assert!(!tracker.end("never-started"));

    tracker.try_begin("s");
    assert!(tracker.end("s"));
    assert!(!tracker.end("s"));
    assert!(tracker.is_empty());
}

#[test]
fn test_sessions_are_independent() {
    let tracker = InFlightTracker::new();
    assert!(tracker.try_begin("a"));
    assert!(tracker.try_begin("b"));
    assert_eq!(tracker.len(), 2);
}

#[test]
fn test_concurrent_begin_admits_exactly_one() {
    const THREADS: usize = 16;

    for _ in 0..20 {
        let tracker = Arc::new(InFlightTracker::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    tracker.try_begin("contended")
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);

        tracker.end("contended");
        assert!(tracker.try_begin("contended"));
    }
}

#[test]
fn test_poisoned_lock_refuses_admission() {
    let tracker = InFlightTracker::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = tracker.sessions.lock().unwrap();
        panic!("holder panicked");
    }));
    assert!(result.is_err());

    assert!(!tracker.try_begin("s"));
    assert!(!tracker.try_begin("other"));
    assert!(!tracker.is_in_flight("s"));
    assert!(!tracker.end("s"));
    assert_eq!(tracker.len(), 0);
}
