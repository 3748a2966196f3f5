//! Network bring-up before the control loop starts.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::NodeConfig;
use crate::error::{CommsError, Error, Result};

use super::ports::ConnectivityPort;

/// Associate with the configured access point, retrying up to
/// `wifi_max_attempts` times with `wifi_retry_delay_ms` between attempts.
///
/// Invalid credentials fail immediately without consuming attempts. On
/// exhaustion the caller is expected to restart the device.
pub fn bring_up_wifi(
    wifi: &mut impl ConnectivityPort,
    delay: &mut impl DelayNs,
    config: &NodeConfig,
) -> Result<u32> {
    if let Err(e) = wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
        warn!("WiFi: {}", e);
        return Err(Error::Comms(CommsError::WifiConnectFailed));
    }

    info!("WiFi: connecting to '{}'", config.wifi_ssid);
    for attempt in 1..=config.wifi_max_attempts {
        match wifi.connect() {
            Ok(()) => {
                info!("WiFi: connected on attempt {}/{}", attempt, config.wifi_max_attempts);
                return Ok(attempt);
            }
            Err(e) => {
                warn!("WiFi: attempt {}/{} failed ({})", attempt, config.wifi_max_attempts, e);
                if attempt < config.wifi_max_attempts {
                    wifi.disconnect();
                    delay.delay_ms(config.wifi_retry_delay_ms);
                }
            }
        }
    }

    warn!("WiFi: all {} attempts failed", config.wifi_max_attempts);
    Err(Error::Comms(CommsError::WifiConnectFailed))
}
