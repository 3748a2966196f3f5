//! Sensor sources, simulated or physical, behind one [`SensorPort`].
//!
//! The variant is chosen at construction time from
//! [`SensorMode`](crate::config::SensorMode), not at build time.

pub mod physical;

use embedded_hal::digital::InputPin;
use log::info;

use crate::app::ports::SensorPort;
use crate::config::{NodeConfig, SensorMode};
use crate::error::SensorError;
use crate::simulation::EnvironmentSimulator;
use physical::{AnalogInput, PhysicalSource};

/// One presence/light sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentReading {
    pub presence: bool,
    /// Raw 12-bit light level (higher = darker).
    pub light_level: u16,
}

/// Synthetic readings driven by the simulated time of day.
pub struct SimulatedSource {
    sim: EnvironmentSimulator,
}

impl SimulatedSource {
    pub fn new(seed: Option<u64>) -> Self {
        let sim = match seed {
            Some(s) => {
                info!("Sensors: simulated (seed={})", s);
                EnvironmentSimulator::with_seed(s)
            }
            None => {
                info!("Sensors: simulated (entropy seed)");
                EnvironmentSimulator::from_entropy()
            }
        };
        Self { sim }
    }

    pub fn simulator(&self) -> &EnvironmentSimulator {
        &self.sim
    }
}

impl SensorPort for SimulatedSource {
    fn on_minute_tick(&mut self) {
        self.sim.on_minute_tick();
    }

    fn sample(&mut self, hour: u8) -> Result<EnvironmentReading, SensorError> {
        Ok(self.sim.sample(hour))
    }
}

/// Runtime-selected sensor source.
pub enum SensorSource<P, A> {
    Simulated(SimulatedSource),
    Physical(PhysicalSource<P, A>),
}

impl<P: InputPin, A: AnalogInput> SensorSource<P, A> {
    /// Build the source named by `config.sensor_mode`. The physical pins are
    /// dropped unused in simulated mode.
    pub fn from_config(config: &NodeConfig, pir: P, ldr: A) -> Self {
        match config.sensor_mode {
            SensorMode::Simulated => Self::Simulated(SimulatedSource::new(config.rng_seed)),
            SensorMode::Physical => {
                info!("Sensors: physical PIR + LDR");
                Self::Physical(PhysicalSource::new(pir, ldr))
            }
        }
    }
}

impl<P: InputPin, A: AnalogInput> SensorPort for SensorSource<P, A> {
    fn on_minute_tick(&mut self) {
        match self {
            Self::Simulated(s) => s.on_minute_tick(),
            Self::Physical(p) => p.on_minute_tick(),
        }
    }

    fn sample(&mut self, hour: u8) -> Result<EnvironmentReading, SensorError> {
        match self {
            Self::Simulated(s) => s.sample(hour),
            Self::Physical(p) => p.sample(hour),
        }
    }
}
