//! Infrastructure layer - adapters for host services.
//!
//! - Tokio-backed deferred execution (`async` feature)

#[cfg(feature = "async")]
pub mod timers;

/// Mock implementations for testing.
///
/// Only available with the `test-helpers` feature or during test builds.
/// Provides controllable test doubles for the host ports.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// cue-timing = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
