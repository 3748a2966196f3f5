//! Application service: the hexagonal core.
//!
//! [`NodeService`] owns the whole [`LightingNodeState`] aggregate: lamp
//! accounting, energy accumulators, the simulated clock, and the report
//! scheduler. All I/O flows through port traits injected at call sites,
//! so the service is testable without a live transport.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         NodeService          │
//!    LampPort ◀── │ Clock · Lamp · Meter · Sched │ ──▶ report hand-off
//!                 └──────────────────────────────┘
//! ```

use log::info;

use crate::config::NodeConfig;
use crate::energy::meter::elapsed_hours_in_day;
use crate::energy::{ConsumptionCalculator, EnergyAccumulators, LampTracker};
use crate::error::SensorError;
use crate::report::ConsumptionReport;
use crate::scheduler::ReportScheduler;
use crate::sensors::EnvironmentReading;
use crate::simulation::{ClockTick, SimulatedClock};

use super::commands::LampCommand;
use super::events::AppEvent;
use super::ports::{EventSink, LampPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// State aggregate
// ───────────────────────────────────────────────────────────────

/// All mutable node state, initialised once at startup.
pub struct LightingNodeState {
    pub(crate) lamp: LampTracker,
    pub(crate) energy: EnergyAccumulators,
    pub(crate) clock: SimulatedClock,
    pub(crate) scheduler: ReportScheduler,
}

impl LightingNodeState {
    pub fn new(config: &NodeConfig, now_ms: u32) -> Self {
        Self {
            lamp: LampTracker::new(now_ms),
            energy: EnergyAccumulators::default(),
            clock: SimulatedClock::new(config.sim_minute_ms, now_ms),
            scheduler: ReportScheduler::new(config.report_policy, now_ms),
        }
    }

    /// Start the simulated clock at a given time of day.
    pub fn with_time_of_day(mut self, hour: u8, minute: u8) -> Self {
        self.clock = self.clock.starting_at(hour, minute);
        self
    }
}

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService {
    state: LightingNodeState,
    calculator: ConsumptionCalculator,
    sim_minute_ms: u32,
}

impl NodeService {
    pub fn new(config: &NodeConfig, now_ms: u32) -> Self {
        Self::from_state(config, LightingNodeState::new(config, now_ms))
    }

    pub fn from_state(config: &NodeConfig, state: LightingNodeState) -> Self {
        Self {
            state,
            calculator: ConsumptionCalculator::new(config.lamp_rated_watts),
            sim_minute_ms: config.sim_minute_ms,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            sim_minute_ms: self.sim_minute_ms,
        });
        info!(
            "NodeService started (1 simulated minute = {} ms)",
            self.sim_minute_ms
        );
    }

    // ── Commands ──────────────────────────────────────────────

    /// Drive the lamp output and the on-time accounting together.
    pub fn handle_command(
        &mut self,
        cmd: LampCommand,
        now_ms: u32,
        lamp: &mut impl LampPort,
        sink: &mut impl EventSink,
    ) {
        let (on, changed) = match cmd {
            LampCommand::On => (true, self.state.lamp.turn_on(now_ms)),
            LampCommand::Off => (false, self.state.lamp.turn_off(now_ms)),
        };
        lamp.set_lamp(on);
        if changed {
            sink.emit(&AppEvent::LampChanged { on });
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance the simulated clock. On a minute tick the sensor source's
    /// presence memory is decremented; on an hour boundary the report
    /// scheduler is notified.
    pub fn advance_clock(&mut self, now_ms: u32, sensors: &mut impl SensorPort) -> Option<ClockTick> {
        let tick = self.state.clock.advance(now_ms)?;
        sensors.on_minute_tick();
        if tick.hour_rollover {
            self.state.scheduler.on_hour_rollover(tick.day_rollover);
        }
        Some(tick)
    }

    pub fn sample(
        &mut self,
        sensors: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> Result<EnvironmentReading, SensorError> {
        let reading = sensors.sample(self.state.clock.hour())?;
        sink.emit(&AppEvent::Reading(reading));
        Ok(reading)
    }

    /// If a report is due, compute it, pass it to `hand_off`, and only then
    /// close the day when the report was the midnight one.
    pub fn poll_report(
        &mut self,
        now_ms: u32,
        sink: &mut impl EventSink,
        hand_off: impl FnOnce(&ConsumptionReport),
    ) -> Option<ConsumptionReport> {
        let due = self.state.scheduler.poll(now_ms)?;

        let hour = self.state.clock.hour();
        let cumulative = self.calculator.current_kwh(&mut self.state.lamp, now_ms);
        let hours = if due.closes_day { 24 } else { elapsed_hours_in_day(hour) };
        let metrics = self.state.energy.close_period(cumulative, hours);

        let report = ConsumptionReport {
            hour,
            metrics,
            on_time_ms: self.state.lamp.folded_on_ms(),
            lamp_on: self.state.lamp.is_on(),
            closes_day: due.closes_day,
        };

        sink.emit(&AppEvent::Report(report));
        hand_off(&report);

        if due.closes_day {
            self.state.energy.close_day();
            sink.emit(&AppEvent::DayClosed {
                total_wh: report.daily_total_wh(),
            });
        }
        Some(report)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Cumulative kWh since start, folded up to `now_ms`.
    pub fn current_kwh(&mut self, now_ms: u32) -> f64 {
        self.calculator.current_kwh(&mut self.state.lamp, now_ms)
    }

    pub fn accumulated_on_ms(&mut self, now_ms: u32) -> u64 {
        self.state.lamp.accumulated_on_ms(now_ms)
    }

    pub fn lamp_on(&self) -> bool {
        self.state.lamp.is_on()
    }

    pub fn daily_kwh(&self) -> f64 {
        self.state.energy.daily_kwh()
    }

    pub fn sim_time(&self) -> (u8, u8) {
        (self.state.clock.hour(), self.state.clock.minute())
    }

    pub fn report_pending(&self) -> bool {
        self.state.scheduler.trigger().is_pending()
    }
}
