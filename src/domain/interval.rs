//! Randomized delay ranges for periodic events.
//!
//! An [`IntervalRange`] is a validated half-open range `[min, max)` from which
//! the delay before each firing of a periodic event is drawn.

use rand::Rng;
use std::time::Duration;

/// Error returned when an interval range is constructed with `max < min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvertedRange {
    /// The requested lower bound
    pub min: Duration,
    /// The requested upper bound
    pub max: Duration,
}

/// A validated range of delays between periodic firings.
///
/// # Example
/// ```
/// use cue_timing::IntervalRange;
/// use std::time::Duration;
///
/// let range = IntervalRange::new(Duration::from_millis(100), Duration::from_millis(300)).unwrap();
/// let delay = range.sample(&mut rand::thread_rng());
/// assert!(delay >= range.min() && delay < range.max());
///
/// assert!(IntervalRange::new(Duration::from_secs(2), Duration::from_secs(1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalRange {
    min: Duration,
    max: Duration,
}

impl IntervalRange {
    /// Create a new range.
    ///
    /// # Errors
    /// Returns [`InvertedRange`] if `max < min`.
    pub fn new(min: Duration, max: Duration) -> Result<Self, InvertedRange> {
        if max < min {
            return Err(InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range that always yields the same delay.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound (exclusive unless equal to `min`).
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Whether both bounds are equal.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Draw a uniformly distributed delay in `[min, max)`.
    ///
    /// A fixed range returns `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.is_fixed() {
            return self.min;
        }
        rng.gen_range(self.min..self.max)
    }
}
