//! # cue-timing
//!
//! Timing primitives for cue-driven interactive effects, such as playing a
//! sound when a tracked face nods, turns or tilts.
//!
//! - [`PeriodicEvent`] runs an event function at random intervals within a
//!   configured range, until cancelled.
//! - [`LimitedEvent`] gates an event function so bursts of invocations
//!   collapse into one execution per cooldown window.
//!
//! Both components are independent. Host services (the timer queue and
//! the face tracker's rotation signal) are injected through the [`Timers`]
//! and [`RotationSource`] ports instead of being looked up globally.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cue_timing::{LimitedEvent, PeriodicEvent};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), cue_timing::EventError> {
//! // Blink somewhere between every 2 and 6 seconds
//! let blink = PeriodicEvent::builder()
//!     .with_event_fn(|| println!("blink"))
//!     .with_interval(Duration::from_secs(2), Duration::from_secs(6))
//!     .build()?;
//! blink.schedule()?;
//!
//! // Never play the sound more than once per 200ms (the default)
//! let sound = LimitedEvent::builder()
//!     .with_event_fn(|| println!("whoosh"))
//!     .build()?;
//! let on_head_move = sound.gate();
//! on_head_move();
//! on_head_move(); // dropped
//! # Ok(())
//! # }
//! ```
//!
//! ## Periodic Events
//!
//! Each delay is drawn uniformly from `[min_time, max_time)`; equal bounds give
//! a constant cadence. The next firing is armed only after the event function
//! returns, so an event never overlaps its own firings on a single-threaded
//! host. On a multi-threaded runtime, a [`PeriodicEvent::schedule`] call from
//! another thread while the event function runs arms a new sequence at once,
//! and its first firing may start before the running one returns.
//!
//! Calling [`PeriodicEvent::cancel`] from inside the event function stops the
//! sequence, and calling [`PeriodicEvent::schedule`] while scheduled replaces
//! the pending timer rather than adding a second one.
//!
//! ## Limited Events
//!
//! The cooldown window is measured from the start of the last execution. With
//! a 200ms cooldown, invocations at t = 0, 50, 150 and 250ms execute at 0 and
//! 250 only. If the reopen timer cannot be armed the invocation is dropped and
//! a warning is logged.
//!
//! ## Testing
//!
//! Enable the `test-helpers` feature to get `ManualTimers`, a virtual-time
//! timer service, along with a scripted rotation source and a log capture
//! layer:
//!
//! ```rust
//! # #[cfg(feature = "test-helpers")]
//! # {
//! use cue_timing::infrastructure::mocks::ManualTimers;
//! use cue_timing::{PeriodicConfig, PeriodicEvent};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let timers = ManualTimers::new();
//! let event = PeriodicEvent::new(
//!     || {},
//!     PeriodicConfig::fixed(Duration::from_millis(100)),
//!     Arc::new(timers.clone()),
//! );
//! event.schedule().unwrap();
//! timers.advance(Duration::from_millis(500));
//! assert_eq!(event.metrics().executed(), 5);
//! # }
//! ```

// Domain layer - pure timing logic
pub mod domain;

// Application layer - components and ports
pub mod application;

// Infrastructure layer - host adapters
pub mod infrastructure;

pub use domain::{
    gate::GateDecision,
    interval::{IntervalRange, InvertedRange},
    state::{PeriodicState, TimerHandle},
};

pub use application::{
    config::{
        LimitedConfig, PeriodicConfig, RotationTriggerConfig, DEFAULT_MAX_FREQUENCY,
        DEFAULT_ROTATION_THRESHOLD,
    },
    error::EventError,
    limited::{make_limited_event, LimitedEvent, LimitedEventBuilder},
    metrics::{Metrics, MetricsSnapshot},
    periodic::{schedule_event, PeriodicEvent, PeriodicEventBuilder, DEFAULT_INTERVAL},
    ports::{EventFn, RotationAxis, RotationSource, TimerTask, Timers},
    trigger::attach_head_rotation,
};

#[cfg(feature = "async")]
pub use infrastructure::timers::TokioTimers;
