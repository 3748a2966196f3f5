//! Lamp energy accounting: on-time tracking, kWh conversion, and the
//! period/daily accumulators behind each consumption report.

pub mod lamp;
pub mod meter;

pub use lamp::LampTracker;
pub use meter::{ConsumptionCalculator, EnergyAccumulators, PeriodMetrics};
