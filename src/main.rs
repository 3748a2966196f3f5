//! LightNode Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter      MqttTransport    SystemClock   LogEventSink  │
//! │  (Connectivity)   (Transport)      (Clock)       (EventSink)   │
//! │  OneshotLdr + PIR PinDriver        LampDriver                  │
//! │  (SensorSource)                    (Lamp)                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │         ControlLoop ─▶ NodeService (pure logic)        │    │
//! │  │  SimulatedClock · LampTracker · Meter · Scheduler      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::reset::restart;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use lightnode::adapters::hardware::OneshotLdr;
use lightnode::adapters::log_sink::LogEventSink;
use lightnode::adapters::mqtt::MqttTransport;
use lightnode::adapters::time::SystemClock;
use lightnode::adapters::wifi::WifiAdapter;
use lightnode::app::control_loop::{ControlLoop, NodeIo};
use lightnode::app::link::bring_up_wifi;
use lightnode::config::NodeConfig;
use lightnode::drivers::LampDriver;
use lightnode::error::Error;
use lightnode::pins;
use lightnode::sensors::SensorSource;

/// Defaults, with network credentials overridable at build time.
fn build_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    if let Some(ssid) = option_env!("WIFI_SSID") {
        config.wifi_ssid.clear();
        if config.wifi_ssid.push_str(ssid).is_err() {
            warn!("WIFI_SSID longer than 32 bytes, ignored");
        }
    }
    if let Some(pass) = option_env!("WIFI_PASS") {
        config.wifi_password.clear();
        if config.wifi_password.push_str(pass).is_err() {
            warn!("WIFI_PASS longer than 64 bytes, ignored");
        }
    }
    if let Some(host) = option_env!("MQTT_HOST") {
        let mut h = heapless::String::new();
        if h.push_str(host).is_ok() {
            config.mqtt_host = h;
        } else {
            warn!("MQTT_HOST longer than 64 bytes, ignored");
        }
    }
    config
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LightNode v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = build_config();
    config.validate().map_err(Error::from)?;
    info!(
        "Simulation: 1 min = {} ms, sampling every {} ms, lamp {:.1} W",
        config.sim_minute_ms, config.sample_interval_ms, config.lamp_rated_watts
    );

    // ── 3. WiFi ───────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = WifiAdapter::new(peripherals.modem, sys_loop, Some(nvs))?;
    let mut delay = FreeRtos;
    if let Err(e) = bring_up_wifi(&mut wifi, &mut delay, &config) {
        error!("WiFi bring-up failed ({}), restarting", e);
        restart();
    }

    // ── 4. Peripherals ────────────────────────────────────────
    // The gpioN fields below must match the numbers in `pins`.
    let pir = PinDriver::input(peripherals.pins.gpio13)?;
    let lamp = LampDriver::new(PinDriver::output(peripherals.pins.gpio12)?);
    let ldr = OneshotLdr::new()?;
    info!(
        "Lamp on GPIO{}, PIR on GPIO{}, LDR on GPIO{} (ADC1 CH{})",
        pins::LAMP_GPIO,
        pins::PIR_GPIO,
        pins::LDR_ADC_GPIO,
        pins::LDR_ADC_CHANNEL
    );

    let transport = MqttTransport::new(&config.mqtt_host, config.mqtt_port);
    let sensors = SensorSource::from_config(&config, pir, ldr);

    // ── 5. Control loop ───────────────────────────────────────
    let io = NodeIo {
        clock: SystemClock::new(),
        transport,
        sensors,
        lamp,
        sink: LogEventSink::new(),
        delay: FreeRtos,
    };
    let mut node = ControlLoop::new(config, io);

    match node.run() {
        Ok(never) => match never {},
        Err(e) => {
            error!("Control loop stopped ({}), restarting", e);
            restart();
        }
    }
}
