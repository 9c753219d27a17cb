//! Ports (interfaces) for the application layer.
//!
//! The host environment owns the timer queue and the face-tracking signal
//! graph. Both are reached only through these traits, so timing logic can be
//! driven deterministically in tests. Infrastructure adapters implement them.

use crate::application::error::EventError;
use crate::domain::state::TimerHandle;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

/// A zero-argument, side-effecting event function.
pub type EventFn = Arc<dyn Fn() + Send + Sync>;

/// A one-shot action run when a timer elapses.
pub type TimerTask = Box<dyn FnOnce() + Send>;

/// Port for deferred execution.
///
/// Infrastructure provides concrete implementations (`TokioTimers`,
/// `ManualTimers`).
///
/// Implementations must not hold internal locks while running a task: tasks
/// routinely arm or cancel other timers on the same service.
pub trait Timers: Send + Sync + Debug {
    /// Run `task` once after `delay`.
    ///
    /// # Errors
    /// Returns `EventError::SchedulingFailure` if the timer cannot be armed.
    fn set_timer(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, EventError>;

    /// Cancel a pending timer.
    ///
    /// Cancelling an unknown or already-fired timer is a no-op.
    fn cancel_timer(&self, handle: TimerHandle);
}

/// Axis of a head rotation as reported by the host's face tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationAxis {
    /// Rotation about the x axis
    Nod,
    /// Rotation about the y axis
    Turn,
    /// Rotation about the z axis
    Tilt,
}

impl RotationAxis {
    /// All axes in x, y, z order.
    pub const ALL: [RotationAxis; 3] = [RotationAxis::Nod, RotationAxis::Turn, RotationAxis::Tilt];
}

impl fmt::Display for RotationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationAxis::Nod => "nod",
            RotationAxis::Turn => "turn",
            RotationAxis::Tilt => "tilt",
        };
        f.write_str(name)
    }
}

/// Port for the host's rotation signal.
///
/// The host detects quick rotational movement on an axis (smoothing and
/// thresholding live in the host signal graph) and calls `handler` on each
/// rising edge.
pub trait RotationSource: Send + Sync {
    /// Subscribe `handler` to quick movements on `axis` exceeding `threshold`.
    fn subscribe(&self, axis: RotationAxis, threshold: f32, handler: EventFn);
}
