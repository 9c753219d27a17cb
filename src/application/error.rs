//! Errors raised while configuring or scheduling events.

use crate::domain::interval::InvertedRange;
use std::time::Duration;
use thiserror::Error;

/// Error returned by event construction and scheduling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventError {
    /// The maximum interval is smaller than the minimum interval
    #[error("invalid interval range: max {max:?} is less than min {min:?}")]
    InvalidRange {
        /// Requested minimum interval
        min: Duration,
        /// Requested maximum interval
        max: Duration,
    },

    /// No event function was supplied
    #[error("an event function is required")]
    InvalidCallback,

    /// Rotation threshold must be finite and non-negative
    #[error("rotation threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f32),

    /// The deferred execution service could not arm a timer
    #[error("failed to arm timer: {0}")]
    SchedulingFailure(String),
}

impl From<InvertedRange> for EventError {
    fn from(e: InvertedRange) -> Self {
        EventError::InvalidRange {
            min: e.min,
            max: e.max,
        }
    }
}
