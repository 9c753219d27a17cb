//! Wiring handlers to quick head rotations.

use crate::application::config::RotationTriggerConfig;
use crate::application::error::EventError;
use crate::application::ports::{EventFn, RotationAxis, RotationSource};
use tracing::debug;

/// Call `handler` whenever the tracked head nods, turns or tilts quickly.
///
/// The same handler is subscribed on all three axes, so a movement that
/// registers on several axes at once calls it several times; wrap it in a
/// [`LimitedEvent`](crate::LimitedEvent) to collapse such bursts.
///
/// # Errors
/// Returns `EventError::InvalidThreshold` if the configured threshold is
/// negative or not finite.
///
/// # Example
/// ```
/// use cue_timing::infrastructure::mocks::{ManualTimers, MockRotationSource};
/// use cue_timing::{attach_head_rotation, LimitedEvent, RotationAxis, RotationTriggerConfig};
/// use std::sync::Arc;
///
/// let face = MockRotationSource::new();
/// let sound = LimitedEvent::builder()
///     .with_event_fn(|| println!("whoosh"))
///     .with_timers(Arc::new(ManualTimers::new()))
///     .build()
///     .unwrap();
///
/// attach_head_rotation(&face, sound.clone().into_event_fn(), RotationTriggerConfig::default()).unwrap();
///
/// face.emit(RotationAxis::Nod);
/// face.emit(RotationAxis::Tilt);
/// assert_eq!(sound.metrics().executed(), 1);
/// ```
pub fn attach_head_rotation<R>(
    source: &R,
    handler: EventFn,
    config: RotationTriggerConfig,
) -> Result<(), EventError>
where
    R: RotationSource + ?Sized,
{
    config.validate()?;

    for axis in RotationAxis::ALL {
        source.subscribe(axis, config.threshold, handler.clone());
        debug!(%axis, threshold = config.threshold, "subscribed to head rotation");
    }
    Ok(())
}
