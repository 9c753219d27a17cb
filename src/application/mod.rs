//! Application layer - the timing components and their wiring.
//!
//! - Periodic events (randomized self-rescheduling timers)
//! - Limited events (cooldown gates)
//! - Head rotation wiring
//!
//! ## Ports
//!
//! The application layer defines ports (traits) for the host services it
//! needs. Infrastructure adapters implement them.

pub mod config;
pub mod error;
pub mod limited;
pub mod metrics;
pub mod periodic;
pub mod ports;
pub mod trigger;
