//! Monotonic millisecond clock.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side runs.
//!
//! [`ClockPort::now_ms`] truncates to `u32`, so the value wraps after about
//! 49.7 days of uptime. Consumers compare timestamps with `wrapping_sub`.

use crate::app::ports::ClockPort;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl ClockPort for SystemClock {
    fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1000) as u32
    }
}
