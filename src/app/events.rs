//! Outbound application events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them, usually a line on the serial console.

use crate::report::ConsumptionReport;
use crate::sensors::EnvironmentReading;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started.
    Started { sim_minute_ms: u32 },

    /// The lamp changed state.
    LampChanged { on: bool },

    /// A command payload was received but not recognised.
    CommandIgnored,

    /// A sensor sample was taken.
    Reading(EnvironmentReading),

    /// A consumption report was produced.
    Report(ConsumptionReport),

    /// The daily accumulator was reset after the midnight report.
    DayClosed { total_wh: f64 },
}
