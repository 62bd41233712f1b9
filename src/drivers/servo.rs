//! Hobby servo driver (50 Hz PWM, 544 – 2400 µs pulse).
//!
//! Angles map linearly onto the pulse range across the servo's travel.
//! Requests past the travel are clamped, so a command of 200° on a 180°
//! servo drives it to its end stop.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::error::ActuatorError;

pub const PERIOD_US: u16 = 20_000;
pub const MIN_PULSE_US: u16 = 544;
pub const MAX_PULSE_US: u16 = 2_400;

/// Pulse width for `angle` on a servo with `travel_max` degrees of travel.
pub fn pulse_us(angle: u16, travel_max: u16) -> u16 {
    let travel = u32::from(travel_max.max(1));
    let angle = u32::from(angle).min(travel);
    let span = u32::from(MAX_PULSE_US - MIN_PULSE_US);
    MIN_PULSE_US + (angle * span / travel) as u16
}

pub struct Servo<P> {
    pwm: P,
    travel_max: u16,
    label: &'static str,
    angle: Option<u16>,
}

impl<P: SetDutyCycle> Servo<P> {
    pub fn new(label: &'static str, pwm: P, travel_max: u16) -> Self {
        Self {
            pwm,
            travel_max,
            label,
            angle: None,
        }
    }

    /// Angle last written (after clamping); `None` before the first write.
    pub fn angle(&self) -> Option<u16> {
        self.angle
    }

    pub fn set_angle(&mut self, angle: u16) -> Result<(), ActuatorError> {
        let clamped = angle.min(self.travel_max);
        if clamped != angle {
            warn!(
                "servo {}: {}° beyond {}° travel, clamped",
                self.label, angle, self.travel_max
            );
        }
        self.pwm
            .set_duty_cycle_fraction(pulse_us(clamped, self.travel_max), PERIOD_US)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.angle = Some(clamped);
        Ok(())
    }
}
