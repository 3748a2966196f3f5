//! Simulated environment: an accelerated time-of-day clock and the
//! presence/light generator driven by it.

pub mod clock;
pub mod environment;

pub use clock::{ClockTick, SimulatedClock};
pub use environment::{EnvironmentSimulator, PresenceMemory};
