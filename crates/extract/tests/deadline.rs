// ABOUTME: Integration tests for per-call deadlines: overrun, no leaked timers, nesting and concurrency.
// ABOUTME: Uses real sleeps, so each test takes a few seconds of wall-clock time.

use std::thread;
use std::time::{Duration, Instant};

use morning_extract::{run_with_deadline, run_with_token, TimeoutError};

#[test]
fn operation_within_limit_returns_value() {
    let result = run_with_deadline(Duration::from_secs(5), || 1 + 1);
    assert_eq!(result, Ok(2));
}

#[test]
fn overrun_is_reported_and_nothing_leaks_into_the_next_call() {
    let result = run_with_deadline(Duration::from_secs(1), || thread::sleep(Duration::from_secs(3)));
    assert_eq!(result, Err(TimeoutError::new(Duration::from_secs(1))));

    let started = Instant::now();
    let result = run_with_deadline(Duration::from_secs(5), || thread::sleep(Duration::from_secs(2)));
    let elapsed = started.elapsed();

    assert!(result.is_ok());
    assert!(
        elapsed > Duration::from_millis(1500) && elapsed < Duration::from_secs(3),
        "elapsed {:?}",
        elapsed
    );
}

#[test]
fn inner_timeout_leaves_outer_deadline_armed() {
    let outer = run_with_deadline(Duration::from_secs(5), || {
        let inner = run_with_deadline(Duration::from_secs(1), || {
            thread::sleep(Duration::from_secs(3));
        });
        assert!(inner.is_err());
        2 + 2
    });
    assert_eq!(outer, Ok(4));

    // The outer guard still fires on its own after an inner one has.
    let outer = run_with_token(Duration::from_millis(800), |token| {
        let inner = run_with_deadline(Duration::from_millis(100), || {
            thread::sleep(Duration::from_millis(500));
        });
        assert!(inner.is_err());
        while !token.is_cancelled() {
            thread::sleep(Duration::from_millis(20));
        }
    });
    assert!(outer.is_err());
}

#[test]
fn concurrent_deadlines_are_independent() {
    let short = thread::spawn(|| {
        run_with_deadline(Duration::from_millis(200), || {
            thread::sleep(Duration::from_secs(1));
        })
    });
    let long = thread::spawn(|| {
        run_with_deadline(Duration::from_secs(3), || {
            thread::sleep(Duration::from_millis(600));
            "done"
        })
    });

    assert!(short.join().unwrap().is_err());
    assert_eq!(long.join().unwrap(), Ok("done"));
}
