//! Synthetic presence (PIR) and light (LDR) generator.
//!
//! Encodes a plausible day/night occupancy pattern, not a physical model:
//!
//! | Hour band   | Light (12-bit ADC) | Presence chance |
//! |-------------|--------------------|-----------------|
//! | 18:00–23:59 | 2500..4095 (dark)  | 35 %            |
//! | 06:00–17:59 | 0..800 (bright)    | 10 %            |
//! | 00:00–05:59 | 2500..4095 (dark)  | 5 %             |
//!
//! Once presence triggers, a *presence memory* keeps it active for a
//! random 15..45 simulated minutes.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::sensors::EnvironmentReading;

const NIGHT_LIGHT: core::ops::Range<u16> = 2500..4095;
const DAY_LIGHT: core::ops::Range<u16> = 0..800;
const PRESENCE_HOLD_TICKS: core::ops::Range<u16> = 15..45;

/// Presence cooldown counter, in simulated-minute ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceMemory {
    remaining_ticks: u16,
}

impl PresenceMemory {
    pub fn remaining_ticks(&self) -> u16 {
        self.remaining_ticks
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ticks > 0
    }

    fn hold_for(&mut self, ticks: u16) {
        self.remaining_ticks = ticks;
    }

    fn tick(&mut self) {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
    }
}

/// Night covers [18, 24) and [0, 6).
pub fn is_night(hour: u8) -> bool {
    hour >= 18 || hour < 6
}

/// Percent chance of a new presence event in the given hour.
pub fn presence_chance_percent(hour: u8) -> u8 {
    match hour {
        18..=23 => 35,
        6..=17 => 10,
        _ => 5,
    }
}

pub struct EnvironmentSimulator {
    rng: Pcg64Mcg,
    memory: PresenceMemory,
}

impl EnvironmentSimulator {
    /// Deterministic stream for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
            memory: PresenceMemory::default(),
        }
    }

    /// Seeded from platform entropy (hardware RNG on ESP-IDF).
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg64Mcg::from_entropy(),
            memory: PresenceMemory::default(),
        }
    }

    pub fn presence_memory(&self) -> PresenceMemory {
        self.memory
    }

    /// Called once per simulated minute.
    pub fn on_minute_tick(&mut self) {
        self.memory.tick();
    }

    /// Produce one reading for `hour`. Mutates the presence memory; call
    /// exactly once per tick, right after [`on_minute_tick`](Self::on_minute_tick).
    pub fn sample(&mut self, hour: u8) -> EnvironmentReading {
        let light_level = if is_night(hour) {
            self.rng.gen_range(NIGHT_LIGHT)
        } else {
            self.rng.gen_range(DAY_LIGHT)
        };

        let presence = if self.memory.is_active() {
            true
        } else if self.rng.gen_range(0..100u8) < presence_chance_percent(hour) {
            let hold = self.rng.gen_range(PRESENCE_HOLD_TICKS);
            self.memory.hold_for(hold);
            true
        } else {
            false
        };

        EnvironmentReading {
            presence,
            light_level,
        }
    }
}
