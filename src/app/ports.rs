//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (clock, sensors, lamp, transport, WiFi, event sinks) implement
//! these traits. The [`NodeService`](super::service::NodeService) and
//! [`ControlLoop`](super::control_loop::ControlLoop) consume them via
//! generics, so the domain core never touches hardware directly.

use crate::error::{CommsError, SensorError};
use crate::sensors::EnvironmentReading;

use super::commands::InboundMessage;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: system timer → domain)
// ───────────────────────────────────────────────────────────────

/// Milliseconds since boot. Monotonic, wraps at `u32::MAX`; every
/// elapsed-time computation must use `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: sensors → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for presence and light.
pub trait SensorPort {
    /// Called once per simulated minute. Physical sources ignore it.
    fn on_minute_tick(&mut self) {}

    /// Take one reading. `hour` is the simulated hour of day.
    fn sample(&mut self, hour: u8) -> Result<EnvironmentReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Lamp port (driven adapter: domain → lamp output)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the lamp output.
pub trait LampPort {
    fn set_lamp(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ MQTT broker)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe session with the broker.
///
/// Inbound messages are queued by the adapter and drained with
/// [`try_receive`](TransportPort::try_receive); the control loop never
/// runs domain logic from inside an adapter callback.
pub trait TransportPort {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError>;

    fn is_connected(&self) -> bool;

    /// Service the session (keep-alive, inbound delivery).
    fn pump(&mut self);

    /// Next queued inbound message, if any.
    fn try_receive(&mut self) -> Option<InboundMessage>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain → WiFi station)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl core::fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

/// Station-mode link to the access point.
pub trait ConnectivityPort {
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;

    /// One association attempt. Blocks until the link is up or the attempt fails.
    fn connect(&mut self) -> Result<(), ConnectivityError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
