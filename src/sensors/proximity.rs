//! Left/right IR obstacle modules.
//!
//! Each module drives its digital output LOW when something reflects
//! inside its detection range.  The analog output is sampled alongside
//! for the diagnostic line only; it never influences a decision.
//!
//! ## Dual-target design
//!
//! Digital inputs are any `embedded_hal` [`InputPin`].  Analog samples go
//! through [`hw_init::adc1_read`], which returns injected values on host.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::drivers::hw_init::{self, HwInitError};
use crate::fsm::context::ProximityReading;

pub struct ProximityDetector<P> {
    left: P,
    right: P,
    left_adc_channel: u32,
    right_adc_channel: u32,
}

impl<P: InputPin> ProximityDetector<P> {
    /// `left_adc_gpio` / `right_adc_gpio` must be ADC1-capable pins.
    pub fn new(left: P, right: P, left_adc_gpio: i32, right_adc_gpio: i32) -> Result<Self, HwInitError> {
        Ok(Self {
            left,
            right,
            left_adc_channel: hw_init::adc1_channel_for_gpio(left_adc_gpio)?,
            right_adc_channel: hw_init::adc1_channel_for_gpio(right_adc_gpio)?,
        })
    }

    pub fn read(&mut self) -> ProximityReading {
        ProximityReading {
            left_blocked: Self::blocked(&mut self.left, "left"),
            right_blocked: Self::blocked(&mut self.right, "right"),
            left_analog: hw_init::adc1_read(self.left_adc_channel),
            right_analog: hw_init::adc1_read(self.right_adc_channel),
        }
    }

    /// Active-low.  A failed read counts as clear so it cannot arm a grab.
    fn blocked(pin: &mut P, side: &str) -> bool {
        match pin.is_low() {
            Ok(low) => low,
            Err(_) => {
                warn!("IR {}: digital read failed, treating as clear", side);
                false
            }
        }
    }
}
