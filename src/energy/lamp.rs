//! Lamp on-time accounting.
//!
//! Time is *folded* into the running total whenever it is observed (on a
//! command or a consumption query) instead of on a periodic tick. All
//! interval arithmetic uses `wrapping_sub` so a `millis()`-style counter
//! rollover does not corrupt the total.

/// On/off state plus cumulative on-time.
#[derive(Debug, Clone)]
pub struct LampTracker {
    is_on: bool,
    accumulated_on_ms: u64,
    last_observed_ms: u32,
}

impl LampTracker {
    /// A tracker for a lamp that is off at `now_ms`.
    pub fn new(now_ms: u32) -> Self {
        Self {
            is_on: false,
            accumulated_on_ms: 0,
            last_observed_ms: now_ms,
        }
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Returns `true` if the lamp transitioned from off to on.
    pub fn turn_on(&mut self, now_ms: u32) -> bool {
        if self.is_on {
            return false;
        }
        self.fold(now_ms);
        self.is_on = true;
        self.last_observed_ms = now_ms;
        true
    }

    /// Returns `true` if the lamp transitioned from on to off.
    pub fn turn_off(&mut self, now_ms: u32) -> bool {
        if !self.is_on {
            return false;
        }
        self.fold(now_ms);
        self.is_on = false;
        true
    }

    /// Fold the time since the last observation into the total.
    pub fn fold(&mut self, now_ms: u32) {
        if self.is_on {
            self.accumulated_on_ms += u64::from(now_ms.wrapping_sub(self.last_observed_ms));
        }
        self.last_observed_ms = now_ms;
    }

    /// Total on-time up to `now_ms`. Folds first so the value is never stale.
    pub fn accumulated_on_ms(&mut self, now_ms: u32) -> u64 {
        self.fold(now_ms);
        self.accumulated_on_ms
    }

    /// Total on-time as of the last fold, without observing the clock.
    pub fn folded_on_ms(&self) -> u64 {
        self.accumulated_on_ms
    }
}
