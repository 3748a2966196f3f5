//! Lamp output driver.
//!
//! Drives a single digital output (relay or LED, active HIGH). The
//! driver is generic over [`embedded_hal::digital::OutputPin`], so the
//! ESP-IDF `PinDriver` and host-side fakes plug in the same way.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::LampPort;
use crate::error::ActuatorError;

pub struct LampDriver<P> {
    pin: P,
    is_on: bool,
}

impl<P: OutputPin> LampDriver<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, is_on: false }
    }

    /// Drive the output. State only changes when the pin write succeeds.
    pub fn write(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on { self.pin.set_high() } else { self.pin.set_low() };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.is_on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> LampPort for LampDriver<P> {
    fn set_lamp(&mut self, on: bool) {
        if let Err(e) = self.write(on) {
            warn!("Lamp: {} (requested {})", e, if on { "ON" } else { "OFF" });
        }
    }
}
