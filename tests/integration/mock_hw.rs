//! Mock hardware for integration tests.
//!
//! Records every lamp write and event so tests can assert on the full
//! history without touching real GPIO or a broker.

use std::cell::Cell;

use embedded_hal::delay::DelayNs;
use lightnode::app::events::AppEvent;
use lightnode::app::ports::{ClockPort, EventSink, LampPort, SensorPort};
use lightnode::config::NodeConfig;
use lightnode::error::SensorError;
use lightnode::sensors::EnvironmentReading;

// ── Clock ─────────────────────────────────────────────────────

/// Clock the test moves by hand.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(ms: u32) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) -> u32 {
        let next = self.now.get().wrapping_add(ms);
        self.now.set(next);
        next
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

// ── Lamp ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLamp {
    pub writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockLamp {
    pub fn is_on(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }
}

impl LampPort for MockLamp {
    fn set_lamp(&mut self, on: bool) {
        self.writes.push(on);
    }
}

// ── Sensors ───────────────────────────────────────────────────

pub struct FixedSensors {
    pub reading: EnvironmentReading,
    pub minute_ticks: u32,
    pub samples: u32,
}

impl Default for FixedSensors {
    fn default() -> Self {
        Self {
            reading: EnvironmentReading {
                presence: true,
                light_level: 3000,
            },
            minute_ticks: 0,
            samples: 0,
        }
    }
}

impl SensorPort for FixedSensors {
    fn on_minute_tick(&mut self) {
        self.minute_ticks += 1;
    }

    fn sample(&mut self, _hour: u8) -> Result<EnvironmentReading, SensorError> {
        self.samples += 1;
        Ok(self.reading)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct NoopDelay {
    pub total_ms: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
    }
}

// ── Config ────────────────────────────────────────────────────

/// Defaults with a fixed seed and a 1 ms simulated minute.
#[allow(dead_code)]
pub fn fast_config() -> NodeConfig {
    let mut cfg = NodeConfig::default();
    cfg.sim_minute_ms = 1;
    cfg.rng_seed = Some(42);
    cfg
}
