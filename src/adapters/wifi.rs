//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity. Retry policy lives in
//! [`bring_up_wifi`](crate::app::link::bring_up_wifi); this adapter makes
//! exactly one association attempt per `connect()`.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use log::info;
#[cfg(not(target_os = "espidf"))]
use log::warn;

use crate::app::ports::{ConnectivityError, ConnectivityPort};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    sys::EspError,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: remaining attempts that fail before one succeeds.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, EspError> {
        let esp_wifi = EspWifi::new(modem, sys_loop.clone(), nvs)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;
        Ok(Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            wifi,
        })
    }

    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        self.wifi
            .set_configuration(&conf)
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi
                .start()
                .map_err(|_| ConnectivityError::ConnectionFailed)?;
        }
        self.wifi
            .connect()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        self.wifi
            .wait_netif_up()
            .map_err(|_| ConnectivityError::ConnectionFailed)
    }

    fn platform_disconnect(&mut self) {
        let _ = self.wifi.disconnect();
    }

    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self::with_failures(0)
    }

    /// Simulated link whose first `failures` attempts fail.
    pub fn with_failures(failures: u32) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            sim_failures_left: failures,
            sim_connected: false,
        }
    }

    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            warn!("WiFi(sim): association refused");
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_connected = true;
        info!("WiFi(sim): associated with '{}'", self.ssid);
        Ok(())
    }

    fn platform_disconnect(&mut self) {
        self.sim_connected = false;
    }

    fn platform_is_connected(&self) -> bool {
        self.sim_connected
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        self.platform_connect()
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
