//! Domain layer - pure timing logic with no runtime dependencies.
//!
//! - Randomized interval ranges
//! - Periodic event lifecycle states
//! - Gate decisions

pub mod gate;
pub mod interval;
pub mod state;
