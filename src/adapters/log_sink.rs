//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production, `log` facade on the
//! host). One event, one line.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { sim_minute_ms } => {
                info!(
                    "START | 1 simulated minute = {} ms | 1 simulated day = {} s",
                    sim_minute_ms,
                    u64::from(*sim_minute_ms) * 24 * 60 / 1000
                );
            }
            AppEvent::LampChanged { on } => {
                info!("LAMP | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::CommandIgnored => {
                info!("LAMP | command ignored");
            }
            AppEvent::Reading(r) => {
                debug!(
                    "SENSE | movement={} light={}",
                    u8::from(r.presence),
                    r.light_level
                );
            }
            AppEvent::Report(r) => {
                info!(
                    "[REPORT {:02}:00] hour {:.4} Wh | day total {:.4} Wh",
                    r.label_hour(),
                    r.period_wh(),
                    r.daily_total_wh()
                );
                info!(
                    "REPORT | cumulative={:.6} kWh avg={:.4} Wh/h on_time={:.2} min lamp={}",
                    r.metrics.cumulative_kwh,
                    r.metrics.daily_avg_wh,
                    r.on_time_min(),
                    if r.lamp_on { "ON" } else { "OFF" }
                );
            }
            AppEvent::DayClosed { total_wh } => {
                info!("DAY | closed with {:.4} Wh, daily total reset", total_wh);
            }
        }
    }
}
