//! Lifecycle state machine for periodic events.
//!
//! ```text
//!            schedule              fire (same generation)
//!   Idle ─────────────▶ Scheduled ───────────────────────┐
//!     ▲                  │  ▲  │                          │
//!     │ arm failure      │  └──┘ schedule (re-arm)        │ re-arm
//!     └──────────────────┘     │                          │
//!                     cancel   ▼                          │
//!                         Cancelled ◀─────────────────────┘ (cancel inside callback)
//! ```
//!
//! Each transition into `Scheduled` bumps a generation counter. A firing only
//! re-arms when the generation it was armed with is still current, which makes
//! `cancel()` and `schedule()` called from inside the callback deterministic.

use std::fmt;

/// Opaque identifier of a timer armed through a [`Timers`](crate::Timers) service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a raw timer id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw timer id.
    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Lifecycle state of a periodic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodicState {
    /// Never scheduled, or the last re-arm failed
    #[default]
    Idle,
    /// A timer is pending
    Scheduled {
        /// Handle of the single pending timer
        timer: TimerHandle,
        /// Generation the pending timer was armed with
        generation: u64,
    },
    /// Cancelled; inert until scheduled again
    Cancelled,
}

impl PeriodicState {
    /// Whether a timer is pending.
    pub fn is_scheduled(&self) -> bool {
        matches!(self, PeriodicState::Scheduled { .. })
    }

    /// The pending timer, if any.
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        match self {
            PeriodicState::Scheduled { timer, .. } => Some(*timer),
            _ => None,
        }
    }

    /// Whether a firing armed with `generation` is still the live one.
    pub fn is_current(&self, generation: u64) -> bool {
        matches!(self, PeriodicState::Scheduled { generation: g, .. } if *g == generation)
    }
}
