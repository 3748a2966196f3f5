//! Actuator drivers.

pub mod lamp;

pub use lamp::LampDriver;
