//! Energy conversion and report-period accumulators.

use super::lamp::LampTracker;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// kWh consumed by a lamp of `rated_watts` that has been on for `on_ms`.
pub fn kwh_for(rated_watts: f64, on_ms: u64) -> f64 {
    (rated_watts * (on_ms as f64 / MS_PER_HOUR)) / 1000.0
}

/// Converts folded lamp on-time into energy.
#[derive(Debug, Clone, Copy)]
pub struct ConsumptionCalculator {
    rated_watts: f64,
}

impl ConsumptionCalculator {
    pub fn new(rated_watts: f64) -> Self {
        Self { rated_watts }
    }

    pub fn rated_watts(&self) -> f64 {
        self.rated_watts
    }

    /// Cumulative kWh since start. Forces a fold up to `now_ms`.
    pub fn current_kwh(&self, lamp: &mut LampTracker, now_ms: u32) -> f64 {
        kwh_for(self.rated_watts, lamp.accumulated_on_ms(now_ms))
    }
}

/// Figures for one report period, before formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodMetrics {
    pub cumulative_kwh: f64,
    pub period_kwh: f64,
    pub daily_kwh: f64,
    /// Daily consumption divided by the hours elapsed in the day, in Wh.
    pub daily_avg_wh: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyAccumulators {
    last_queried_kwh: f64,
    cumulative_kwh: f64,
    daily_kwh: f64,
}

impl EnergyAccumulators {
    pub fn cumulative_kwh(&self) -> f64 {
        self.cumulative_kwh
    }

    pub fn daily_kwh(&self) -> f64 {
        self.daily_kwh
    }

    /// Fold a fresh cumulative reading into the period and daily totals.
    /// `elapsed_hours` must be in 1..=24.
    pub fn close_period(&mut self, cumulative_kwh: f64, elapsed_hours: u8) -> PeriodMetrics {
        self.cumulative_kwh = cumulative_kwh;
        let period_kwh = cumulative_kwh - self.last_queried_kwh;
        self.last_queried_kwh = cumulative_kwh;
        self.daily_kwh += period_kwh;

        PeriodMetrics {
            cumulative_kwh,
            period_kwh,
            daily_kwh: self.daily_kwh,
            daily_avg_wh: (self.daily_kwh * 1000.0) / f64::from(elapsed_hours.max(1)),
        }
    }

    /// Day closeout. Only the daily figure resets.
    pub fn close_day(&mut self) {
        self.daily_kwh = 0.0;
    }
}

/// Hours completed in the simulated day at a report for `hour`; the
/// midnight report counts as a full 24.
pub fn elapsed_hours_in_day(hour: u8) -> u8 {
    if hour == 0 { 24 } else { hour }
}
