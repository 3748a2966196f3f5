//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                 |
//! |-------------|--------------------|-----------------------------|
//! | `hardware`  | AnalogInput        | ESP32 ADC1 oneshot (LDR)    |
//! | `log_sink`  | EventSink          | Serial log output           |
//! | `mqtt`      | TransportPort      | ESP-IDF MQTT / in-memory sim|
//! | `time`      | ClockPort          | ESP32 system timer          |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA            |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
