//! Hardware adapter: the LDR on ADC1 behind [`AnalogInput`].
//!
//! Uses the ESP-IDF oneshot ADC driver through raw sys calls, 12-bit
//! width and 12 dB attenuation so the full 0..3.3 V divider swing maps
//! onto `0..=4095`. The PIR and lamp pins go through `esp_idf_hal`
//! `PinDriver`s and need no adapter of their own.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::error::{Error, SensorError};
#[cfg(target_os = "espidf")]
use crate::pins;
#[cfg(target_os = "espidf")]
use crate::sensors::physical::AnalogInput;

/// Light-dependent resistor on one ADC1 channel.
#[cfg(target_os = "espidf")]
pub struct OneshotLdr {
    unit: adc_oneshot_unit_handle_t,
    channel: adc_channel_t,
}

#[cfg(target_os = "espidf")]
impl OneshotLdr {
    /// Claim ADC1 and configure the LDR channel. Call once at boot.
    pub fn new() -> Result<Self, Error> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut unit: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: `unit` is a valid out-pointer; ADC1 is claimed only here.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut unit) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("ADC1 unit init failed"));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        let channel = pins::LDR_ADC_CHANNEL as adc_channel_t;
        // SAFETY: `unit` was returned by adc_oneshot_new_unit above.
        let ret = unsafe { adc_oneshot_config_channel(unit, channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            // SAFETY: release the unit we just created.
            unsafe { adc_oneshot_del_unit(unit) };
            return Err(Error::Init("LDR channel config failed"));
        }

        info!(
            "hardware: LDR on GPIO{} (ADC1 CH{})",
            pins::LDR_ADC_GPIO,
            pins::LDR_ADC_CHANNEL
        );
        Ok(Self { unit, channel })
    }
}

#[cfg(target_os = "espidf")]
impl AnalogInput for OneshotLdr {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        // SAFETY: `self.unit` stays valid until Drop; only the control
        // loop thread reads it.
        let ret = unsafe { adc_oneshot_read(self.unit, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.max(0) as u16)
    }
}

#[cfg(target_os = "espidf")]
impl Drop for OneshotLdr {
    fn drop(&mut self) {
        // SAFETY: the handle is owned by this value and not used after drop.
        unsafe { adc_oneshot_del_unit(self.unit) };
    }
}
