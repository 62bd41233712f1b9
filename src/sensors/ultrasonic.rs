//! HC-SR04 ultrasonic ranger driver.
//!
//! A 10 µs trigger pulse starts a burst; the module then holds its echo
//! pin HIGH for the round-trip time of flight.  The driver times that pulse
//! against a microsecond clock, `pulseIn`-style: any stale pulse is waited
//! out, then the rising and falling edges are timed, all inside a single
//! timeout budget.
//!
//! A measurement that times out (or fails at the GPIO level) is not an
//! error to the rest of the firmware: [`UltrasonicSensor::distance_cm`]
//! reports the sentinel distance, meaning "nothing in range".

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::error::SensorError;

/// Speed of sound at room temperature, cm per µs.
pub const SOUND_CM_PER_US: f32 = 0.0343;

/// Monotonic microsecond time source used to time echo pulses.
pub trait MicrosClock {
    fn now_us(&self) -> u64;
}

/// Convert a round-trip echo duration to a one-way distance.
pub fn echo_to_cm(echo_us: u32) -> f32 {
    echo_us as f32 * SOUND_CM_PER_US / 2.0
}

/// Substitute the sentinel for a zero reading.
pub fn normalize_cm(distance_cm: f32, sentinel_cm: f32) -> f32 {
    if distance_cm == 0.0 {
        sentinel_cm
    } else {
        distance_cm
    }
}

/// One trigger/echo channel pair.
pub struct UltrasonicSensor<T, E> {
    trigger: T,
    echo: E,
    timeout_us: u32,
    sentinel_cm: f32,
    label: &'static str,
}

impl<T: OutputPin, E: InputPin> UltrasonicSensor<T, E> {
    pub fn new(label: &'static str, trigger: T, echo: E, timeout_us: u32, sentinel_cm: f32) -> Self {
        Self {
            trigger,
            echo,
            timeout_us,
            sentinel_cm,
            label,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Fire the trigger and time the echo pulse (µs).  No retries.
    pub fn measure_echo_us<C: MicrosClock + DelayNs>(&mut self, clock: &mut C) -> Result<u32, SensorError> {
        self.fire(&mut *clock)?;

        let deadline = clock.now_us() + u64::from(self.timeout_us);

        // A previous pulse may still be in flight.
        while self.echo_high()? {
            if clock.now_us() >= deadline {
                return Err(SensorError::EchoTimeout);
            }
        }
        while !self.echo_high()? {
            if clock.now_us() >= deadline {
                return Err(SensorError::EchoTimeout);
            }
        }
        let rise = clock.now_us();
        while self.echo_high()? {
            if clock.now_us() >= deadline {
                return Err(SensorError::EchoTimeout);
            }
        }
        let fall = clock.now_us();

        Ok(fall.saturating_sub(rise) as u32)
    }

    /// Distance in centimetres; the sentinel on timeout or read failure.
    pub fn distance_cm<C: MicrosClock + DelayNs>(&mut self, clock: &mut C) -> f32 {
        match self.measure_echo_us(clock) {
            Ok(us) => normalize_cm(echo_to_cm(us), self.sentinel_cm),
            Err(SensorError::EchoTimeout) => self.sentinel_cm,
            Err(e) => {
                warn!("sonar {}: {}, reporting clear", self.label, e);
                self.sentinel_cm
            }
        }
    }

    fn fire(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        self.trigger.set_low().map_err(|_| SensorError::GpioWriteFailed)?;
        delay.delay_us(2);
        self.trigger.set_high().map_err(|_| SensorError::GpioWriteFailed)?;
        delay.delay_us(10);
        self.trigger.set_low().map_err(|_| SensorError::GpioWriteFailed)
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::GpioReadFailed)
    }
}
