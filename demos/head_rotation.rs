//! Head rotation sound cue, with a simulated face tracker.
//!
//! A simulated face produces quick movements on each rotation axis at random
//! intervals. Every movement tries to play a sound, but a limited event keeps
//! playback to at most once per cooldown window.
//!
//! Run with:
//! ```text
//! RUST_LOG=cue_timing=debug cargo run --example head_rotation
//! cargo run --example head_rotation -- '{"movement": {"min_time_ms": 20, "max_time_ms": 400}}'
//! ```

use anyhow::Context;
use cue_timing::{
    attach_head_rotation, EventFn, LimitedConfig, LimitedEvent, PeriodicConfig, PeriodicEvent,
    RotationAxis, RotationSource, RotationTriggerConfig, Timers, TokioTimers,
};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    movement: PeriodicConfig,
    sound: LimitedConfig,
    trigger: RotationTriggerConfig,
    run_for_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            movement: PeriodicConfig::fixed(Duration::from_millis(150)),
            sound: LimitedConfig::default(),
            trigger: RotationTriggerConfig::default(),
            run_for_ms: 3_000,
        }
    }
}

/// Stand-in for the host face tracker: each axis "moves" at random intervals.
struct SimulatedFace {
    timers: Arc<dyn Timers>,
    movement: PeriodicConfig,
    detectors: Mutex<Vec<PeriodicEvent>>,
}

impl SimulatedFace {
    fn new(timers: Arc<dyn Timers>, movement: PeriodicConfig) -> Self {
        Self {
            timers,
            movement,
            detectors: Mutex::new(Vec::new()),
        }
    }

    fn start(&self) -> anyhow::Result<()> {
        for detector in self.detectors.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            detector.schedule()?;
        }
        Ok(())
    }

    fn stop(&self) {
        for detector in self.detectors.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            detector.cancel();
        }
    }
}

impl RotationSource for SimulatedFace {
    fn subscribe(&self, axis: RotationAxis, threshold: f32, handler: EventFn) {
        let detector = PeriodicEvent::new(
            move || {
                info!(%axis, threshold, "quick head movement");
                handler();
            },
            self.movement,
            Arc::clone(&self.timers),
        );
        self.detectors.lock().unwrap_or_else(PoisonError::into_inner).push(detector);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config: DemoConfig = match std::env::args().nth(1) {
        Some(json) => serde_json::from_str(&json).context("invalid demo config")?,
        None => DemoConfig::default(),
    };
    info!(?config, "starting head rotation demo");

    let timers: Arc<dyn Timers> = Arc::new(TokioTimers::new());

    let plays = Arc::new(AtomicU64::new(0));
    let p = Arc::clone(&plays);
    let sound = LimitedEvent::new(
        move || {
            let n = p.fetch_add(1, Ordering::Relaxed) + 1;
            info!(play = n, "playing head move sound");
        },
        config.sound,
        Arc::clone(&timers),
    );

    let face = SimulatedFace::new(Arc::clone(&timers), config.movement);
    attach_head_rotation(&face, sound.clone().into_event_fn(), config.trigger)?;
    face.start()?;

    tokio::time::sleep(Duration::from_millis(config.run_for_ms)).await;
    face.stop();

    let snapshot = sound.metrics().snapshot();
    info!(
        played = snapshot.executed,
        dropped = snapshot.dropped,
        drop_rate = %format!("{:.1}%", snapshot.drop_rate() * 100.0),
        "demo finished"
    );
    Ok(())
}
