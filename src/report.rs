//! Outbound message formatting.
//!
//! Field names and precisions are part of the wire contract with the
//! dashboard consuming these topics. Numbers are always written in plain
//! fixed-decimal form:
//!
//! | Field              | Unit | Decimals |
//! |--------------------|------|----------|
//! | `consumo_kwh`      | kWh  | 6        |
//! | `consumo_wh`       | Wh   | 4        |
//! | `media_dia_wh`     | Wh   | 4        |
//! | `total_dia_wh`     | Wh   | 4        |
//! | `tempo_ligado_min` | min  | 2        |
//! | `led_estado`       |      | `ON`/`OFF` |

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::energy::PeriodMetrics;
use crate::error::CommsError;
use crate::sensors::EnvironmentReading;

/// Everything known about a report period, in domain units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionReport {
    /// Simulated hour at which the report was taken (0 = midnight).
    pub hour: u8,
    pub metrics: PeriodMetrics,
    pub on_time_ms: u64,
    pub lamp_on: bool,
    /// The daily accumulator is reset after this report.
    pub closes_day: bool,
}

impl ConsumptionReport {
    pub fn period_wh(&self) -> f64 {
        self.metrics.period_kwh * 1000.0
    }

    pub fn daily_total_wh(&self) -> f64 {
        self.metrics.daily_kwh * 1000.0
    }

    pub fn on_time_min(&self) -> f64 {
        (self.on_time_ms as f64 / 1000.0) / 60.0
    }

    /// Clock label for logs: the midnight report reads as hour 24.
    pub fn label_hour(&self) -> u8 {
        if self.hour == 0 { 24 } else { self.hour }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LedState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

/// Consumption topic body. Values are kept unrounded; each one is written
/// as a fixed-decimal JSON number at its wire precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportMessage {
    #[serde(serialize_with = "decimals_6")]
    pub consumo_kwh: f64,
    #[serde(serialize_with = "decimals_4")]
    pub consumo_wh: f64,
    #[serde(serialize_with = "decimals_4")]
    pub media_dia_wh: f64,
    #[serde(serialize_with = "decimals_4")]
    pub total_dia_wh: f64,
    #[serde(serialize_with = "decimals_2")]
    pub tempo_ligado_min: f64,
    pub led_estado: LedState,
}

/// Sensor topic body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorMessage {
    pub movimento: u8,
    pub luminosidade: u16,
}

// serde_json would switch to exponent notation for small values (`3e-6`)
// and drop trailing zeros, so the number text is written verbatim.
fn fixed<S: Serializer>(value: f64, decimals: usize, serializer: S) -> Result<S::Ok, S::Error> {
    let raw = RawValue::from_string(format!("{:.*}", decimals, value)).map_err(S::Error::custom)?;
    raw.serialize(serializer)
}

fn decimals_6<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    fixed(*value, 6, serializer)
}

fn decimals_4<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    fixed(*value, 4, serializer)
}

fn decimals_2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    fixed(*value, 2, serializer)
}

pub fn format_report(report: &ConsumptionReport) -> ReportMessage {
    ReportMessage {
        consumo_kwh: report.metrics.cumulative_kwh,
        consumo_wh: report.period_wh(),
        media_dia_wh: report.metrics.daily_avg_wh,
        total_dia_wh: report.daily_total_wh(),
        tempo_ligado_min: report.on_time_min(),
        led_estado: if report.lamp_on { LedState::On } else { LedState::Off },
    }
}

pub fn format_reading(reading: &EnvironmentReading) -> SensorMessage {
    SensorMessage {
        movimento: u8::from(reading.presence),
        luminosidade: reading.light_level,
    }
}

/// Serialise a message body to JSON bytes.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, CommsError> {
    serde_json::to_vec(message).map_err(|_| CommsError::EncodeFailed)
}
