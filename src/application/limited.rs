//! Cooldown-gated event functions.
//!
//! A [`LimitedEvent`] wraps an event function so that bursts of invocations
//! collapse into at most one execution per cooldown window. It protects
//! effects such as audio playback from re-triggering faster than is sensible
//! when several upstream detectors fire at nearly the same moment.

use crate::application::config::LimitedConfig;
use crate::application::error::EventError;
use crate::application::metrics::Metrics;
use crate::application::periodic::default_timers;
use crate::application::ports::{EventFn, Timers};
use crate::domain::gate::GateDecision;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// An event function that runs at most once per cooldown window.
///
/// The window starts when an execution begins. Invocations arriving while
/// the gate is closed are dropped without queuing.
///
/// # Example
/// ```
/// use cue_timing::infrastructure::mocks::ManualTimers;
/// use cue_timing::LimitedEvent;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let timers = ManualTimers::new();
/// let chime = LimitedEvent::builder()
///     .with_event_fn(|| println!("chime"))
///     .with_max_frequency(Duration::from_millis(200))
///     .with_timers(Arc::new(timers.clone()))
///     .build()
///     .unwrap();
///
/// assert!(chime.trigger().is_executed());
/// assert!(chime.trigger().is_dropped());
///
/// timers.advance(Duration::from_millis(200));
/// assert!(chime.trigger().is_executed());
/// ```
#[derive(Clone)]
pub struct LimitedEvent {
    inner: Arc<Inner>,
}

struct Inner {
    event_fn: EventFn,
    cooldown: Duration,
    timers: Arc<dyn Timers>,
    gate_open: AtomicBool,
    metrics: Metrics,
}

impl LimitedEvent {
    /// Create a limited event with an open gate.
    pub fn new<F>(event_fn: F, config: LimitedConfig, timers: Arc<dyn Timers>) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(event_fn), config.max_frequency, timers)
    }

    /// Create a builder for configuring a limited event.
    pub fn builder() -> LimitedEventBuilder {
        LimitedEventBuilder::default()
    }

    fn from_parts(event_fn: EventFn, cooldown: Duration, timers: Arc<dyn Timers>) -> Self {
        Self {
            inner: Arc::new(Inner {
                event_fn,
                cooldown,
                timers,
                gate_open: AtomicBool::new(true),
                metrics: Metrics::new(),
            }),
        }
    }

    /// Invoke the gate.
    ///
    /// If the gate is open it closes, the reopen timer is armed for the
    /// cooldown, and the event function runs synchronously. Otherwise the
    /// invocation is dropped.
    ///
    /// If the reopen timer cannot be armed the invocation is dropped and the
    /// gate is left open, so a later invocation retries. The failure is
    /// logged and counted.
    pub fn trigger(&self) -> GateDecision {
        let inner = &self.inner;

        if !inner.cooldown.is_zero() {
            if inner
                .gate_open
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                inner.metrics.record_dropped();
                debug!("limited event dropped: gate closed");
                return GateDecision::Dropped;
            }

            let reopen = Arc::clone(inner);
            match inner
                .timers
                .set_timer(inner.cooldown, Box::new(move || reopen.reopen()))
            {
                Ok(timer) => {
                    trace!(%timer, cooldown_ms = inner.cooldown.as_millis() as u64, "gate closed")
                }
                Err(e) => {
                    inner.gate_open.store(true, Ordering::Release);
                    inner.metrics.record_scheduling_failure();
                    inner.metrics.record_dropped();
                    warn!(error = %e, "failed to arm gate reopen timer; invocation dropped");
                    return GateDecision::Dropped;
                }
            }
        }

        (inner.event_fn)();
        inner.metrics.record_executed();
        GateDecision::Executed
    }

    /// A cloneable handler that triggers this event, for use as a callback.
    pub fn gate(&self) -> impl Fn() + Send + Sync + Clone + 'static {
        let event = self.clone();
        move || {
            event.trigger();
        }
    }

    /// Convert into a shared [`EventFn`] handler.
    pub fn into_event_fn(self) -> EventFn {
        Arc::new(move || {
            self.trigger();
        })
    }

    /// Whether the next invocation would execute.
    pub fn is_open(&self) -> bool {
        self.inner.cooldown.is_zero() || self.inner.gate_open.load(Ordering::Acquire)
    }

    /// Minimum duration between executions.
    pub fn cooldown(&self) -> Duration {
        self.inner.cooldown
    }

    /// Execution counters for this event.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}

impl Inner {
    fn reopen(&self) {
        self.gate_open.store(true, Ordering::Release);
        trace!("gate reopened");
    }
}

impl fmt::Debug for LimitedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitedEvent")
            .field("cooldown", &self.inner.cooldown)
            .field("open", &self.is_open())
            .field("timers", &self.inner.timers)
            .finish_non_exhaustive()
    }
}

/// Builder for [`LimitedEvent`].
#[derive(Default)]
pub struct LimitedEventBuilder {
    event_fn: Option<EventFn>,
    config: LimitedConfig,
    timers: Option<Arc<dyn Timers>>,
}

impl LimitedEventBuilder {
    /// Set the function to rate limit.
    pub fn with_event_fn<F>(mut self, event_fn: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_fn = Some(Arc::new(event_fn));
        self
    }

    /// Set the minimum duration between executions (default 200ms).
    pub fn with_max_frequency(mut self, max_frequency: Duration) -> Self {
        self.config.max_frequency = max_frequency;
        self
    }

    /// Take the cooldown from a config record.
    pub fn with_config(mut self, config: LimitedConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the deferred execution service.
    ///
    /// Defaults to `TokioTimers` with the `async` feature.
    pub fn with_timers(mut self, timers: Arc<dyn Timers>) -> Self {
        self.timers = Some(timers);
        self
    }

    /// Build the limited event with its gate open.
    ///
    /// # Errors
    /// - `EventError::InvalidCallback` if no event function was set
    /// - `EventError::SchedulingFailure` if no timers were set and no tokio
    ///   runtime is available
    pub fn build(self) -> Result<LimitedEvent, EventError> {
        let event_fn = self.event_fn.ok_or(EventError::InvalidCallback)?;
        let timers = match self.timers {
            Some(timers) => timers,
            None => default_timers()?,
        };
        Ok(LimitedEvent::from_parts(
            event_fn,
            self.config.max_frequency,
            timers,
        ))
    }
}

/// Wrap `event_fn` with the default 200ms cooldown and return the gate.
pub fn make_limited_event<F>(
    event_fn: F,
    timers: Arc<dyn Timers>,
) -> impl Fn() + Send + Sync + Clone + 'static
where
    F: Fn() + Send + Sync + 'static,
{
    LimitedEvent::new(event_fn, LimitedConfig::default(), timers).gate()
}
