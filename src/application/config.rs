//! Configuration records for periodic and limited events.
//!
//! Each component takes exactly one statically typed configuration record.
//! Records deserialize from millisecond fields:
//!
//! ```
//! use cue_timing::{LimitedConfig, PeriodicConfig};
//! use std::time::Duration;
//!
//! let periodic: PeriodicConfig =
//!     serde_json::from_str(r#"{ "min_time_ms": 500, "max_time_ms": 1500 }"#).unwrap();
//! assert_eq!(periodic.min_time(), Duration::from_millis(500));
//!
//! let limited: LimitedConfig = serde_json::from_str("{}").unwrap();
//! assert_eq!(limited.max_frequency, Duration::from_millis(200));
//! ```

use crate::application::error::EventError;
use crate::domain::interval::IntervalRange;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cooldown between executions of a limited event.
pub const DEFAULT_MAX_FREQUENCY: Duration = Duration::from_millis(200);

/// Default sensitivity for head rotation detection.
pub const DEFAULT_ROTATION_THRESHOLD: f32 = 0.4;

/// Configuration for a [`PeriodicEvent`](crate::PeriodicEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriodicConfig", into = "RawPeriodicConfig")]
pub struct PeriodicConfig {
    range: IntervalRange,
}

impl PeriodicConfig {
    /// Create a config firing at random intervals in `[min_time, max_time)`.
    ///
    /// # Errors
    /// Returns `EventError::InvalidRange` if `max_time < min_time`.
    pub fn new(min_time: Duration, max_time: Duration) -> Result<Self, EventError> {
        Ok(Self {
            range: IntervalRange::new(min_time, max_time)?,
        })
    }

    /// Create a config firing at a constant cadence.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            range: IntervalRange::fixed(interval),
        }
    }

    /// Minimum duration between firings.
    pub fn min_time(&self) -> Duration {
        self.range.min()
    }

    /// Maximum duration between firings.
    pub fn max_time(&self) -> Duration {
        self.range.max()
    }

    /// The validated delay range.
    pub fn range(&self) -> IntervalRange {
        self.range
    }
}

#[derive(Serialize, Deserialize)]
struct RawPeriodicConfig {
    min_time_ms: u64,
    max_time_ms: u64,
}

impl TryFrom<RawPeriodicConfig> for PeriodicConfig {
    type Error = EventError;

    fn try_from(raw: RawPeriodicConfig) -> Result<Self, Self::Error> {
        PeriodicConfig::new(
            Duration::from_millis(raw.min_time_ms),
            Duration::from_millis(raw.max_time_ms),
        )
    }
}

impl From<PeriodicConfig> for RawPeriodicConfig {
    fn from(config: PeriodicConfig) -> Self {
        Self {
            min_time_ms: duration_to_millis(config.min_time()),
            max_time_ms: duration_to_millis(config.max_time()),
        }
    }
}

/// Configuration for a [`LimitedEvent`](crate::LimitedEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitedConfig {
    /// Minimum duration between executions of the event function
    #[serde(rename = "max_frequency_ms", with = "millis", default = "default_max_frequency")]
    pub max_frequency: Duration,
}

impl LimitedConfig {
    /// Create a config with the given cooldown.
    pub fn new(max_frequency: Duration) -> Self {
        Self { max_frequency }
    }
}

impl Default for LimitedConfig {
    fn default() -> Self {
        Self {
            max_frequency: DEFAULT_MAX_FREQUENCY,
        }
    }
}

fn default_max_frequency() -> Duration {
    DEFAULT_MAX_FREQUENCY
}

/// Configuration for attaching a handler to head rotation movements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationTriggerConfig {
    /// Sensitivity passed to the host's movement detector
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

impl RotationTriggerConfig {
    /// Create a config with a custom threshold.
    ///
    /// # Errors
    /// Returns `EventError::InvalidThreshold` if `threshold` is negative or not finite.
    pub fn new(threshold: f32) -> Result<Self, EventError> {
        let config = Self { threshold };
        config.validate()?;
        Ok(config)
    }

    /// Check the threshold, e.g. after deserializing.
    pub fn validate(&self) -> Result<(), EventError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(EventError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

impl Default for RotationTriggerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ROTATION_THRESHOLD,
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_ROTATION_THRESHOLD
}

fn duration_to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(super::duration_to_millis(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
