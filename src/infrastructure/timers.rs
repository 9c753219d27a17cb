//! Tokio-backed deferred execution.
//!
//! Each armed timer is a spawned task that sleeps for its delay and then runs
//! its action. Pending tasks are tracked in a `DashMap` so they can be aborted.
//!
//! # Testing
//!
//! See `ManualTimers` (in `crate::infrastructure::mocks`) for a virtual-time
//! timer service. Available with the `test-helpers` feature or in test builds:
//!
//! ```toml
//! [dev-dependencies]
//! cue-timing = { version = "*", features = ["test-helpers"] }
//! ```

use crate::application::error::EventError;
use crate::application::ports::{TimerTask, Timers};
use crate::domain::state::TimerHandle;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// [`Timers`] implementation that spawns a tokio task per timer.
///
/// The runtime must have its time driver enabled.
#[derive(Debug, Clone, Default)]
pub struct TokioTimers {
    runtime: Option<Handle>,
    pending: Arc<DashMap<TimerHandle, AbortHandle>>,
    next_id: Arc<AtomicU64>,
}

impl TokioTimers {
    /// Spawn onto whichever runtime is current when a timer is armed.
    ///
    /// Arming a timer outside a runtime fails with `SchedulingFailure`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn onto a specific runtime, from any thread.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            runtime: Some(handle),
            ..Self::default()
        }
    }

    /// Number of timers armed and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn runtime(&self) -> Result<Handle, EventError> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|e| EventError::SchedulingFailure(e.to_string())),
        }
    }
}

impl Timers for TokioTimers {
    fn set_timer(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, EventError> {
        let runtime = self.runtime()?;
        let handle = TimerHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        // Hold the entry until the abort handle is stored so a zero-delay
        // task cannot finish before it is registered.
        let entry = self.pending.entry(handle);
        let pending = Arc::clone(&self.pending);
        let join = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if pending.remove(&handle).is_some() {
                task();
            }
        });
        entry.insert(join.abort_handle());

        Ok(handle)
    }

    fn cancel_timer(&self, handle: TimerHandle) {
        if let Some((_, task)) = self.pending.remove(&handle) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::PeriodicConfig;
    use crate::application::limited::LimitedEvent;
    use crate::application::periodic::PeriodicEvent;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, TimerTask) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (
            count,
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let timers = TokioTimers::new();
        let (count, task) = counter();

        timers.set_timer(Duration::from_millis(100), task).unwrap();
        assert_eq!(timers.pending(), 1);

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(timers.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let timers = TokioTimers::new();
        let (count, task) = counter();

        let handle = timers.set_timer(Duration::from_millis(50), task).unwrap();
        timers.cancel_timer(handle);
        timers.cancel_timer(handle);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(timers.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_event_on_tokio() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let event = PeriodicEvent::new(
            move || {
                c.fetch_add(1, Ordering::SeqCst);
            },
            PeriodicConfig::fixed(Duration::from_millis(100)),
            Arc::new(TokioTimers::new()),
        );

        event.schedule().unwrap();
        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(count.load(Ordering::SeqCst), 5);

        event.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_fails_outside_runtime() {
        let timers = TokioTimers::new();
        let result = timers.set_timer(Duration::from_millis(1), Box::new(|| {}));
        assert!(matches!(result, Err(EventError::SchedulingFailure(_))));
    }

    #[test]
    fn test_default_timers_outside_runtime_fail_at_build() {
        let periodic = PeriodicEvent::builder().with_event_fn(|| {}).build();
        assert!(matches!(periodic, Err(EventError::SchedulingFailure(_))));

        let limited = LimitedEvent::builder().with_event_fn(|| {}).build();
        assert!(matches!(limited, Err(EventError::SchedulingFailure(_))));
    }

    #[test]
    fn test_default_timers_bind_to_building_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let event = runtime.block_on(async {
            LimitedEvent::builder()
                .with_event_fn(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                })
                .build()
                .unwrap()
        });

        // Triggered from outside the runtime, the gate still closes.
        assert!(event.trigger().is_executed());
        assert!(event.trigger().is_dropped());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        runtime.block_on(async { tokio::time::sleep(Duration::from_millis(250)).await });
        assert!(event.trigger().is_executed());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_with_handle_arms_from_plain_thread() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let timers = TokioTimers::with_handle(runtime.handle().clone());
        let (count, task) = counter();

        timers.set_timer(Duration::from_millis(5), task).unwrap();
        runtime.block_on(async { tokio::time::sleep(Duration::from_millis(50)).await });

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
