//! Node configuration parameters
//!
//! All tunable parameters for the LightNode system. Defaults reproduce the
//! reference deployment: 1 s of real time per simulated minute (a 24 h
//! simulated day in 24 real minutes), a 9 W lamp, hourly reports.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// How the report scheduler decides a consumption report is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportPolicy {
    /// One report each time the simulated clock rolls over to a new hour.
    SimulatedHour,
    /// One report every `interval_ms` of real elapsed time.
    FixedInterval { interval_ms: u32 },
}

/// Where presence and light readings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorMode {
    /// Synthetic day/night occupancy pattern.
    Simulated,
    /// PIR digital input and LDR analog input.
    Physical,
}

/// MQTT topics used by the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topics {
    /// Presence/light readings (`{"movimento", "luminosidade"}`).
    pub sensors: heapless::String<64>,
    /// Inbound lamp commands (`ON` / `OFF`).
    pub lamp_command: heapless::String<64>,
    /// Consumption reports.
    pub consumption: heapless::String<64>,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            sensors: topic("nelson_iot/sensores"),
            lamp_command: topic("nelson_iot/led_cmd"),
            consumption: topic("nelson_iot/consumo"),
        }
    }
}

fn topic(s: &str) -> heapless::String<64> {
    let mut out = heapless::String::new();
    // Defaults are all well under 64 bytes.
    let _ = out.push_str(s);
    out
}

/// Core node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Simulation ---
    /// Real milliseconds per simulated minute
    pub sim_minute_ms: u32,
    /// Sensor sampling interval (milliseconds)
    pub sample_interval_ms: u32,
    /// Where readings come from
    pub sensor_mode: SensorMode,
    /// Fixed PRNG seed; `None` seeds from platform entropy
    pub rng_seed: Option<u64>,

    // --- Energy ---
    /// Lamp rated power (watts)
    pub lamp_rated_watts: f64,
    /// When consumption reports are emitted
    pub report_policy: ReportPolicy,

    // --- Network ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    /// Connection attempts before giving up and restarting
    pub wifi_max_attempts: u32,
    /// Delay between WiFi status polls (milliseconds)
    pub wifi_retry_delay_ms: u32,

    // --- MQTT ---
    pub mqtt_host: heapless::String<64>,
    pub mqtt_port: u16,
    /// Client id prefix; a random 4-hex-digit suffix is appended per connect
    pub mqtt_client_prefix: heapless::String<16>,
    /// Fixed backoff between broker reconnect attempts (milliseconds)
    pub mqtt_reconnect_backoff_ms: u32,
    /// Reconnect attempts before restart; `None` retries forever
    pub mqtt_max_reconnect_attempts: Option<u32>,
    pub topics: Topics,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let mut wifi_ssid = heapless::String::new();
        let _ = wifi_ssid.push_str("Wokwi-GUEST");
        let mut mqtt_host = heapless::String::new();
        let _ = mqtt_host.push_str("broker.hivemq.com");
        let mut mqtt_client_prefix = heapless::String::new();
        let _ = mqtt_client_prefix.push_str("ESP32Sim");

        Self {
            // Simulation
            sim_minute_ms: 1000, // 1 s real = 1 min simulated
            sample_interval_ms: 1000,
            sensor_mode: SensorMode::Simulated,
            rng_seed: None,

            // Energy
            lamp_rated_watts: 9.0,
            report_policy: ReportPolicy::SimulatedHour,

            // Network
            wifi_ssid,
            wifi_password: heapless::String::new(),
            wifi_max_attempts: 40,
            wifi_retry_delay_ms: 500,

            // MQTT
            mqtt_host,
            mqtt_port: 1883,
            mqtt_client_prefix,
            mqtt_reconnect_backoff_ms: 5000,
            mqtt_max_reconnect_attempts: None,
            topics: Topics::default(),
        }
    }
}

impl NodeConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sim_minute_ms == 0 {
            return Err(ConfigError::ValidationFailed("sim_minute_ms must be > 0"));
        }
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "sample_interval_ms must be > 0",
            ));
        }
        if !self.lamp_rated_watts.is_finite() || !(0.1..=2000.0).contains(&self.lamp_rated_watts)
        {
            return Err(ConfigError::ValidationFailed(
                "lamp_rated_watts must be 0.1–2000.0",
            ));
        }
        if let ReportPolicy::FixedInterval { interval_ms } = self.report_policy {
            if interval_ms == 0 {
                return Err(ConfigError::ValidationFailed(
                    "report interval_ms must be > 0",
                ));
            }
        }
        if self.wifi_max_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "wifi_max_attempts must be > 0",
            ));
        }
        if self.mqtt_host.is_empty() {
            return Err(ConfigError::ValidationFailed("mqtt_host must not be empty"));
        }
        if self.mqtt_port == 0 {
            return Err(ConfigError::ValidationFailed("mqtt_port must be > 0"));
        }
        if self.mqtt_max_reconnect_attempts == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "mqtt_max_reconnect_attempts must be > 0 when set",
            ));
        }
        let t = &self.topics;
        if t.sensors.is_empty() || t.lamp_command.is_empty() || t.consumption.is_empty() {
            return Err(ConfigError::ValidationFailed("topics must not be empty"));
        }
        Ok(())
    }
}
