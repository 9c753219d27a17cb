//! Cooldown gating of limited events, driven by virtual time.

use cue_timing::infrastructure::mocks::ManualTimers;
use cue_timing::{make_limited_event, EventError, GateDecision, LimitedConfig, LimitedEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Invoke `event` at each of the given virtual times and report the decisions.
fn invoke_at(timers: &ManualTimers, event: &LimitedEvent, times_ms: &[u64]) -> Vec<GateDecision> {
    times_ms
        .iter()
        .map(|&t| {
            let now = timers.now();
            timers.advance(ms(t) - now);
            event.trigger()
        })
        .collect()
}

/// Expected executions: an invocation runs if at least `cooldown` has passed
/// since the last one that ran.
fn expected(times_ms: &[u64], cooldown_ms: u64) -> Vec<GateDecision> {
    let mut last: Option<u64> = None;
    times_ms
        .iter()
        .map(|&t| match last {
            Some(prev) if t - prev < cooldown_ms => GateDecision::Dropped,
            _ => {
                last = Some(t);
                GateDecision::Executed
            }
        })
        .collect()
}

#[test]
fn test_reference_invocation_pattern() {
    let timers = ManualTimers::new();
    let event = LimitedEvent::new(|| {}, LimitedConfig::new(ms(200)), Arc::new(timers.clone()));

    let decisions = invoke_at(&timers, &event, &[0, 50, 150, 250]);
    assert_eq!(
        decisions,
        vec![
            GateDecision::Executed,
            GateDecision::Dropped,
            GateDecision::Dropped,
            GateDecision::Executed,
        ]
    );
}

#[test]
fn test_executions_match_cooldown_rule() {
    let patterns: [&[u64]; 4] = [
        &[0, 1, 2, 3, 199, 200, 201, 400, 401],
        &[0, 100, 200, 300, 400, 500, 600],
        &[10, 500, 510, 699, 710, 711, 2000],
        &[0, 0, 0, 199, 399, 400],
    ];

    for pattern in patterns {
        let timers = ManualTimers::new();
        let event =
            LimitedEvent::new(|| {}, LimitedConfig::default(), Arc::new(timers.clone()));

        assert_eq!(
            invoke_at(&timers, &event, pattern),
            expected(pattern, 200),
            "pattern {:?}",
            pattern
        );
    }
}

#[test]
fn test_default_config_gates_at_200ms() {
    let timers = ManualTimers::new();
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let gate = make_limited_event(
        move || {
            c.fetch_add(1, Ordering::SeqCst);
        },
        Arc::new(timers.clone()),
    );

    gate();
    timers.advance(ms(150));
    gate();
    timers.advance(ms(50));
    gate();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_waiting_past_cooldown_always_executes() {
    for cooldown in [1, 10, 200, 5_000] {
        let timers = ManualTimers::new();
        let event =
            LimitedEvent::new(|| {}, LimitedConfig::new(ms(cooldown)), Arc::new(timers.clone()));

        assert!(event.trigger().is_executed());
        timers.advance(ms(cooldown + 1));
        assert!(event.trigger().is_executed());
    }
}

#[test]
fn test_metrics_track_burst() {
    let timers = ManualTimers::new();
    let event = LimitedEvent::new(|| {}, LimitedConfig::default(), Arc::new(timers.clone()));

    for _ in 0..10 {
        event.trigger();
    }
    timers.advance(ms(200));
    event.trigger();

    let snapshot = event.metrics().snapshot();
    assert_eq!(snapshot.executed, 2);
    assert_eq!(snapshot.dropped, 9);
    assert_eq!(snapshot.invocations(), 11);
}

#[test]
fn test_burst_never_executes_twice_when_timers_fail() {
    let timers = ManualTimers::new();
    timers.set_failing(true);
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let event = LimitedEvent::new(
        move || {
            c.fetch_add(1, Ordering::SeqCst);
        },
        LimitedConfig::default(),
        Arc::new(timers.clone()),
    );

    for _ in 0..3 {
        event.trigger();
    }

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(event.metrics().scheduling_failures(), 3);
}

#[cfg(feature = "async")]
#[test]
fn test_default_timers_require_runtime_at_build() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let result = LimitedEvent::builder()
        .with_event_fn(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    assert!(matches!(result, Err(EventError::SchedulingFailure(_))));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
