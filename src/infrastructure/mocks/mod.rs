//! Mock implementations for testing.
//!
//! Test doubles for the host-provided ports, so timing behavior can be
//! exercised without a real runtime or face tracker.

pub mod layer;
pub mod rotation;
pub mod timers;

pub use layer::{CaptureLayer, CapturedEvent};
pub use rotation::MockRotationSource;
pub use timers::ManualTimers;
