//! Unified error types for the LightNode firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the control loop's error handling uniform. All variants are `Copy` so
//! they can be passed through the loop without allocation.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    MqttConnectFailed,
    MqttSubscribeFailed,
    MqttPublishFailed,
    /// Broker reconnect gave up after the configured number of attempts.
    ReconnectExhausted,
    /// Outbound payload could not be serialised.
    EncodeFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::MqttConnectFailed => write!(f, "MQTT connect failed"),
            Self::MqttSubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
            Self::ReconnectExhausted => write!(f, "MQTT reconnect attempts exhausted"),
            Self::EncodeFailed => write!(f, "payload encoding failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
