//! Real presence/light sensors.
//!
//! - HC-SR501 PIR module on a digital input (HIGH = motion).
//! - LDR in a voltage divider on a 12-bit ADC channel (higher = darker).
//!
//! Generic over `embedded-hal` pins so the same code runs against
//! `esp-idf-hal` drivers on target and fakes on the host.

use embedded_hal::digital::InputPin;

use super::EnvironmentReading;
use crate::app::ports::SensorPort;
use crate::error::SensorError;

/// One-shot analog read (raw ADC counts).
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// ADC full scale for a 12-bit converter.
pub const ADC_MAX: u16 = 4095;

pub struct PhysicalSource<P, A> {
    pir: P,
    ldr: A,
}

impl<P: InputPin, A: AnalogInput> PhysicalSource<P, A> {
    pub fn new(pir: P, ldr: A) -> Self {
        Self { pir, ldr }
    }
}

impl<P: InputPin, A: AnalogInput> SensorPort for PhysicalSource<P, A> {
    fn sample(&mut self, _hour: u8) -> Result<EnvironmentReading, SensorError> {
        let presence = self.pir.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        let light_level = self.ldr.read_raw()?.min(ADC_MAX);
        Ok(EnvironmentReading {
            presence,
            light_level,
        })
    }
}
