//! Virtual-time timer service for testing.

use crate::application::error::EventError;
use crate::application::ports::{TimerTask, Timers};
use crate::domain::state::TimerHandle;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Firings allowed at one virtual instant before `advance` assumes a
/// zero-delay timer loop.
pub const MAX_FIRINGS_PER_INSTANT: usize = 10_000;

/// Deterministic [`Timers`] implementation driven by explicit time advances.
///
/// Time starts at zero and only moves when [`advance`](Self::advance) is
/// called. Due timers fire in deadline order (ties in arming order), and
/// timers armed by a firing task fire within the same `advance` call if their
/// deadline falls inside the advanced window.
///
/// # Examples
///
/// ```
/// use cue_timing::infrastructure::mocks::ManualTimers;
/// use cue_timing::Timers;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let timers = ManualTimers::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let h = Arc::clone(&hits);
///
/// timers
///     .set_timer(Duration::from_millis(100), Box::new(move || {
///         h.fetch_add(1, Ordering::SeqCst);
///     }))
///     .unwrap();
///
/// timers.advance(Duration::from_millis(99));
/// assert_eq!(hits.load(Ordering::SeqCst), 0);
///
/// timers.advance(Duration::from_millis(1));
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// assert_eq!(timers.now(), Duration::from_millis(100));
/// ```
///
/// Clones share the same queue and virtual time.
#[derive(Clone, Default)]
pub struct ManualTimers {
    inner: Arc<Mutex<Queue>>,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_id: u64,
    failing: bool,
    pending: Vec<Pending>,
}

struct Pending {
    handle: TimerHandle,
    deadline: Duration,
    task: TimerTask,
}

impl ManualTimers {
    /// Create a timer service at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.inner
            .lock()
            .expect("ManualTimers mutex poisoned - a test thread panicked while holding the lock")
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.queue().now
    }

    /// Number of timers armed and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.queue().pending.len()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue().pending.iter().map(|p| p.deadline).min()
    }

    /// Make subsequent `set_timer` calls fail with `SchedulingFailure`.
    pub fn set_failing(&self, failing: bool) {
        self.queue().failing = failing;
    }

    /// Move virtual time forward, running every timer that becomes due.
    ///
    /// Returns the number of timers that fired.
    ///
    /// # Panics
    /// Panics if more than [`MAX_FIRINGS_PER_INSTANT`] timers fire without
    /// virtual time moving. A periodic event configured with a zero interval
    /// re-arms at the current instant forever and trips this.
    pub fn advance(&self, duration: Duration) -> usize {
        let target = self.now() + duration;
        let mut fired = 0;
        let mut instant = self.now();
        let mut fired_at_instant = 0;

        loop {
            let due = {
                let mut queue = self.queue();
                let next = queue
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.deadline <= target)
                    .min_by_key(|(_, p)| (p.deadline, p.handle))
                    .map(|(i, _)| i);

                match next {
                    Some(i) => {
                        let pending = queue.pending.remove(i);
                        queue.now = pending.deadline;
                        pending.task
                    }
                    None => {
                        queue.now = target;
                        break;
                    }
                }
            };

            let now = self.now();
            if now == instant {
                fired_at_instant += 1;
                assert!(
                    fired_at_instant <= MAX_FIRINGS_PER_INSTANT,
                    "{} timers fired at {:?} without time advancing; \
                     is a periodic event configured with a zero interval?",
                    fired_at_instant,
                    now
                );
            } else {
                instant = now;
                fired_at_instant = 1;
            }

            // Lock released: tasks arm and cancel timers on this service.
            due();
            fired += 1;
        }

        fired
    }

    /// Advance to the earliest pending deadline and fire everything due then.
    ///
    /// Returns the number of timers that fired, zero if nothing is pending.
    pub fn advance_to_next(&self) -> usize {
        match self.next_deadline() {
            Some(deadline) => {
                let now = self.now();
                self.advance(deadline.saturating_sub(now))
            }
            None => 0,
        }
    }
}

impl Timers for ManualTimers {
    fn set_timer(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, EventError> {
        let mut queue = self.queue();
        if queue.failing {
            return Err(EventError::SchedulingFailure(
                "manual timers set to fail".to_string(),
            ));
        }

        queue.next_id += 1;
        let handle = TimerHandle::new(queue.next_id);
        let deadline = queue.now + delay;
        queue.pending.push(Pending {
            handle,
            deadline,
            task,
        });
        Ok(handle)
    }

    fn cancel_timer(&self, handle: TimerHandle) {
        self.queue().pending.retain(|p| p.handle != handle);
    }
}

impl fmt::Debug for ManualTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue();
        f.debug_struct("ManualTimers")
            .field("now", &queue.now)
            .field("pending", &queue.pending.len())
            .field("failing", &queue.failing)
            .finish()
    }
}
