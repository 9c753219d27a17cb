//! End-to-end wiring: rotation detectors feeding a rate-limited sound cue.

use cue_timing::infrastructure::mocks::{CaptureLayer, ManualTimers, MockRotationSource};
use cue_timing::{
    attach_head_rotation, LimitedConfig, LimitedEvent, PeriodicConfig, PeriodicEvent,
    RotationAxis, RotationTriggerConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_simultaneous_axes_play_once() {
    let timers = ManualTimers::new();
    let face = MockRotationSource::new();
    let plays = Arc::new(AtomicUsize::new(0));

    let p = Arc::clone(&plays);
    let sound = LimitedEvent::new(
        move || {
            p.fetch_add(1, Ordering::SeqCst);
        },
        LimitedConfig::default(),
        Arc::new(timers.clone()),
    );
    attach_head_rotation(&face, sound.clone().into_event_fn(), RotationTriggerConfig::default())
        .unwrap();

    face.emit(RotationAxis::Nod);
    face.emit(RotationAxis::Turn);
    face.emit(RotationAxis::Tilt);

    assert_eq!(plays.load(Ordering::SeqCst), 1);
    assert_eq!(sound.metrics().dropped(), 2);
}

#[test]
fn test_periodic_movements_through_gate() {
    // A jittery head: movements every 50ms on one axis, every 120ms on another.
    let timers = ManualTimers::new();
    let face = MockRotationSource::new();
    let plays = Arc::new(AtomicUsize::new(0));

    let p = Arc::clone(&plays);
    let sound = LimitedEvent::new(
        move || {
            p.fetch_add(1, Ordering::SeqCst);
        },
        LimitedConfig::default(),
        Arc::new(timers.clone()),
    );
    attach_head_rotation(&face, sound.clone().into_event_fn(), RotationTriggerConfig::default())
        .unwrap();

    let nod_face = face.clone();
    let nods = PeriodicEvent::new(
        move || {
            nod_face.emit(RotationAxis::Nod);
        },
        PeriodicConfig::fixed(ms(50)),
        Arc::new(timers.clone()),
    );
    let turn_face = face.clone();
    let turns = PeriodicEvent::new(
        move || {
            turn_face.emit(RotationAxis::Turn);
        },
        PeriodicConfig::fixed(ms(120)),
        Arc::new(timers.clone()),
    );

    nods.schedule().unwrap();
    turns.schedule().unwrap();
    timers.advance(ms(1000));
    nods.cancel();
    turns.cancel();

    // Plays at 50, 250, 450, 650, 850; the gate reopens 200ms after each.
    assert_eq!(plays.load(Ordering::SeqCst), 5);

    let snapshot = sound.metrics().snapshot();
    assert_eq!(snapshot.invocations(), 20 + 8);
    assert_eq!(snapshot.dropped, 28 - 5);
}

#[test]
fn test_subscriptions_logged() {
    let capture = CaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let face = MockRotationSource::new();

    tracing::subscriber::with_default(subscriber, || {
        attach_head_rotation(&face, Arc::new(|| {}), RotationTriggerConfig::default()).unwrap();
    });

    let axes: Vec<_> = capture
        .captured()
        .into_iter()
        .filter(|e| e.message.contains("subscribed"))
        .filter_map(|e| e.fields.get("axis").cloned())
        .collect();
    assert_eq!(axes, vec!["nod", "turn", "tilt"]);
}

#[cfg(feature = "async")]
#[tokio::test(start_paused = true)]
async fn test_tokio_runtime_end_to_end() {
    let face = MockRotationSource::new();
    let plays = Arc::new(AtomicUsize::new(0));

    let p = Arc::clone(&plays);
    let sound = LimitedEvent::builder()
        .with_event_fn(move || {
            p.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();
    attach_head_rotation(&face, sound.into_event_fn(), RotationTriggerConfig::default()).unwrap();

    face.emit(RotationAxis::Turn);
    face.emit(RotationAxis::Tilt);
    assert_eq!(plays.load(Ordering::SeqCst), 1);

    tokio::time::sleep(ms(250)).await;
    face.emit(RotationAxis::Nod);
    assert_eq!(plays.load(Ordering::SeqCst), 2);
}
