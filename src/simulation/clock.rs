//! Accelerated time-of-day clock.
//!
//! Advances one simulated minute each time at least `quantum_ms` of real
//! time has elapsed since the previous tick. At most one minute is
//! advanced per observation, so a stalled loop slows the simulated day
//! down rather than bursting through several minutes at once.

/// Outcome of a simulated-minute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    /// The minute wrapped to 0 and the hour advanced.
    pub hour_rollover: bool,
    /// The hour wrapped to 0 (midnight).
    pub day_rollover: bool,
}

#[derive(Debug, Clone)]
pub struct SimulatedClock {
    hour: u8,
    minute: u8,
    last_tick_ms: u32,
    quantum_ms: u32,
}

impl SimulatedClock {
    /// A clock at 00:00 whose first tick is due `quantum_ms` after `start_ms`.
    pub fn new(quantum_ms: u32, start_ms: u32) -> Self {
        Self {
            hour: 0,
            minute: 0,
            last_tick_ms: start_ms,
            quantum_ms,
        }
    }

    /// Start at an arbitrary time of day. Out-of-range values wrap.
    pub fn starting_at(mut self, hour: u8, minute: u8) -> Self {
        self.hour = hour % 24;
        self.minute = minute % 60;
        self
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Advance by one simulated minute if a full quantum has elapsed.
    pub fn advance(&mut self, now_ms: u32) -> Option<ClockTick> {
        if now_ms.wrapping_sub(self.last_tick_ms) < self.quantum_ms {
            return None;
        }
        self.last_tick_ms = now_ms;
        self.minute += 1;

        let mut tick = ClockTick {
            hour_rollover: false,
            day_rollover: false,
        };
        if self.minute >= 60 {
            self.minute = 0;
            self.hour = (self.hour + 1) % 24;
            tick.hour_rollover = true;
            tick.day_rollover = self.hour == 0;
        }
        Some(tick)
    }
}
