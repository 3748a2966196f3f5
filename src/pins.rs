//! GPIO / peripheral pin assignments for the LightNode board (ESP32 DevKit).
//!
//! esp-idf-hal hands out pins as typed `peripherals.pins.gpioN` fields, so
//! `main` names them directly and logs these numbers at boot. The LDR
//! channel is used by the ADC adapter. Change both together.

// ---------------------------------------------------------------------------
// Lamp
// ---------------------------------------------------------------------------

/// Digital output driving the lamp (LED or relay, active HIGH).
pub const LAMP_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// PIR motion sensor, digital input. HIGH = motion.
pub const PIR_GPIO: i32 = 13;

/// LDR voltage divider, ADC1 channel 6. Higher reading = darker.
pub const LDR_ADC_GPIO: i32 = 34;
/// ADC1 channel wired to [`LDR_ADC_GPIO`].
pub const LDR_ADC_CHANNEL: u32 = 6;
