//! Self-rescheduling events fired at random intervals.
//!
//! A [`PeriodicEvent`] runs its event function after a delay drawn uniformly
//! from `[min_time, max_time)`, then arms the next firing, until cancelled.

use crate::application::config::PeriodicConfig;
use crate::application::error::EventError;
use crate::application::metrics::Metrics;
use crate::application::ports::{EventFn, Timers};
use crate::domain::interval::IntervalRange;
use crate::domain::state::PeriodicState;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Interval used by the builder when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// An event function invoked repeatedly at random intervals.
///
/// Cloning yields another handle to the same event. Once scheduled, the event
/// keeps firing until [`cancel`](Self::cancel) is called, even if every handle
/// is dropped.
///
/// # Example
/// ```
/// use cue_timing::infrastructure::mocks::ManualTimers;
/// use cue_timing::PeriodicEvent;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let timers = ManualTimers::new();
/// let blinks = Arc::new(AtomicUsize::new(0));
/// let b = Arc::clone(&blinks);
///
/// let blink = PeriodicEvent::builder()
///     .with_event_fn(move || {
///         b.fetch_add(1, Ordering::SeqCst);
///     })
///     .with_interval(Duration::from_millis(100), Duration::from_millis(100))
///     .with_timers(Arc::new(timers.clone()))
///     .build()
///     .unwrap();
///
/// blink.schedule().unwrap();
/// timers.advance(Duration::from_millis(350));
/// assert_eq!(blinks.load(Ordering::SeqCst), 3);
///
/// blink.cancel();
/// timers.advance(Duration::from_secs(10));
/// assert_eq!(blinks.load(Ordering::SeqCst), 3);
/// ```
#[derive(Clone)]
pub struct PeriodicEvent {
    inner: Arc<Inner>,
}

struct Inner {
    event_fn: EventFn,
    range: IntervalRange,
    timers: Arc<dyn Timers>,
    rng: Mutex<Mcg128Xsl64>,
    slot: Mutex<Slot>,
    metrics: Metrics,
}

#[derive(Default)]
struct Slot {
    state: PeriodicState,
    generation: u64,
}

impl PeriodicEvent {
    /// Create an unscheduled periodic event.
    pub fn new<F>(event_fn: F, config: PeriodicConfig, timers: Arc<dyn Timers>) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(event_fn), config.range(), timers, None)
    }

    /// Create a builder for configuring a periodic event.
    pub fn builder() -> PeriodicEventBuilder {
        PeriodicEventBuilder::default()
    }

    fn from_parts(
        event_fn: EventFn,
        range: IntervalRange,
        timers: Arc<dyn Timers>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };

        Self {
            inner: Arc::new(Inner {
                event_fn,
                range,
                timers,
                rng: Mutex::new(rng),
                slot: Mutex::new(Slot::default()),
                metrics: Metrics::new(),
            }),
        }
    }

    /// Start firing at random intervals.
    ///
    /// Scheduling an already-scheduled event replaces its pending timer, so at
    /// most one timer is ever pending per event.
    ///
    /// # Errors
    /// Returns `EventError::SchedulingFailure` if the timer service refuses to
    /// arm a timer; the event is left idle.
    pub fn schedule(&self) -> Result<(), EventError> {
        let mut slot = self.inner.slot();
        if let Some(timer) = slot.state.pending_timer() {
            trace!(%timer, "replacing pending timer");
            self.inner.timers.cancel_timer(timer);
        }

        self.inner.arm(&mut slot).inspect_err(|e| {
            slot.state = PeriodicState::Idle;
            self.inner.metrics.record_scheduling_failure();
            warn!(error = %e, "failed to schedule periodic event");
        })
    }

    /// Stop firing.
    ///
    /// Safe to call at any time, including from inside the event function;
    /// calling it repeatedly has no further effect. A later
    /// [`schedule`](Self::schedule) resumes firing.
    pub fn cancel(&self) {
        let mut slot = self.inner.slot();
        if let Some(timer) = slot.state.pending_timer() {
            self.inner.timers.cancel_timer(timer);
            slot.state = PeriodicState::Cancelled;
            debug!(%timer, "periodic event cancelled");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PeriodicState {
        self.inner.slot().state
    }

    /// Whether a firing is pending.
    pub fn is_scheduled(&self) -> bool {
        self.state().is_scheduled()
    }

    /// The range delays are drawn from.
    pub fn range(&self) -> IntervalRange {
        self.inner.range
    }

    /// Execution counters for this event.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_delay(&self) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.range.sample(&mut *rng)
    }

    /// Arm the next firing. The caller holds the slot lock.
    fn arm(self: &Arc<Self>, slot: &mut Slot) -> Result<(), EventError> {
        let delay = self.next_delay();
        let generation = slot.generation.wrapping_add(1);
        let inner = Arc::clone(self);

        let timer = self
            .timers
            .set_timer(delay, Box::new(move || inner.fire(generation)))?;

        slot.generation = generation;
        slot.state = PeriodicState::Scheduled { timer, generation };
        trace!(%timer, delay_ms = delay.as_millis() as u64, "periodic event armed");
        Ok(())
    }

    fn fire(self: &Arc<Self>, generation: u64) {
        if !self.slot().state.is_current(generation) {
            trace!(generation, "ignoring superseded firing");
            return;
        }

        (self.event_fn)();
        self.metrics.record_executed();

        // The event function may have cancelled or rescheduled us.
        let mut slot = self.slot();
        if !slot.state.is_current(generation) {
            debug!(generation, "not re-arming: event changed during firing");
            return;
        }

        if let Err(e) = self.arm(&mut slot) {
            slot.state = PeriodicState::Idle;
            self.metrics.record_scheduling_failure();
            warn!(error = %e, "failed to re-arm periodic event; it is now idle");
        }
    }
}

impl fmt::Debug for PeriodicEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicEvent")
            .field("range", &self.inner.range)
            .field("state", &self.state())
            .field("timers", &self.inner.timers)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PeriodicEvent`].
#[derive(Default)]
pub struct PeriodicEventBuilder {
    event_fn: Option<EventFn>,
    interval: Option<(Duration, Duration)>,
    timers: Option<Arc<dyn Timers>>,
    seed: Option<u64>,
}

impl PeriodicEventBuilder {
    /// Set the function invoked on each firing.
    pub fn with_event_fn<F>(mut self, event_fn: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_fn = Some(Arc::new(event_fn));
        self
    }

    /// Set the minimum and maximum time between firings.
    ///
    /// Defaults to a fixed [`DEFAULT_INTERVAL`].
    pub fn with_interval(mut self, min_time: Duration, max_time: Duration) -> Self {
        self.interval = Some((min_time, max_time));
        self
    }

    /// Take the interval from a validated config record.
    pub fn with_config(self, config: PeriodicConfig) -> Self {
        self.with_interval(config.min_time(), config.max_time())
    }

    /// Set the deferred execution service.
    ///
    /// Defaults to `TokioTimers` with the `async` feature.
    pub fn with_timers(mut self, timers: Arc<dyn Timers>) -> Self {
        self.timers = Some(timers);
        self
    }

    /// Seed the delay generator for a reproducible firing sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the periodic event. It starts unscheduled.
    ///
    /// # Errors
    /// - `EventError::InvalidCallback` if no event function was set
    /// - `EventError::InvalidRange` if the maximum interval is below the minimum
    /// - `EventError::SchedulingFailure` if no timers were set and no tokio
    ///   runtime is available
    pub fn build(self) -> Result<PeriodicEvent, EventError> {
        let event_fn = self.event_fn.ok_or(EventError::InvalidCallback)?;
        let range = match self.interval {
            Some((min, max)) => IntervalRange::new(min, max)?,
            None => IntervalRange::fixed(DEFAULT_INTERVAL),
        };
        let timers = match self.timers {
            Some(timers) => timers,
            None => default_timers()?,
        };

        Ok(PeriodicEvent::from_parts(event_fn, range, timers, self.seed))
    }
}

/// Timers bound to the runtime current at build time.
#[cfg(feature = "async")]
pub(crate) fn default_timers() -> Result<Arc<dyn Timers>, EventError> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| EventError::SchedulingFailure(e.to_string()))?;
    Ok(Arc::new(
        crate::infrastructure::timers::TokioTimers::with_handle(runtime),
    ))
}

#[cfg(not(feature = "async"))]
pub(crate) fn default_timers() -> Result<Arc<dyn Timers>, EventError> {
    Err(EventError::SchedulingFailure(
        "no timer service configured".to_string(),
    ))
}

/// Create a periodic event and schedule it immediately.
///
/// # Errors
/// Returns `EventError::SchedulingFailure` if the first firing cannot be armed.
pub fn schedule_event<F>(
    event_fn: F,
    config: PeriodicConfig,
    timers: Arc<dyn Timers>,
) -> Result<PeriodicEvent, EventError>
where
    F: Fn() + Send + Sync + 'static,
{
    let event = PeriodicEvent::new(event_fn, config, timers);
    event.schedule()?;
    Ok(event)
}
