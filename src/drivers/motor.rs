//! Differential drive motor driver (L298N dual H-bridge).
//!
//! Channel A (ENA, IN1, IN2) drives the left motor, channel B (ENB, IN3,
//! IN4) the right.  Speed is the enable pins' PWM duty on the 0 – 255
//! scale; direction is the input pin pattern.
//!
//! | motion     | IN1 | IN2 | IN3 | IN4 |
//! |------------|-----|-----|-----|-----|
//! | forward    |  H  |  L  |  H  |  L  |
//! | backward   |  L  |  H  |  L  |  H  |
//! | turn left  |  L  |  H  |  H  |  L  |
//! | turn right |  H  |  L  |  L  |  H  |
//! | stop       |  L  |  L  |  L  |  L  |
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal` pins: `esp-idf-hal` LEDC channels and
//! `PinDriver`s on target, recording mocks on host.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;
use crate::fsm::context::Motion;

pub struct DualHBridge<EN, IN> {
    ena: EN,
    enb: EN,
    in1: IN,
    in2: IN,
    in3: IN,
    in4: IN,
    motion: Motion,
}

impl<EN: SetDutyCycle, IN: OutputPin> DualHBridge<EN, IN> {
    pub fn new(ena: EN, in1: IN, in2: IN, in3: IN, in4: IN, enb: EN) -> Self {
        Self {
            ena,
            enb,
            in1,
            in2,
            in3,
            in4,
            motion: Motion::Stop,
        }
    }

    /// Last motion successfully applied.
    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn apply(&mut self, motion: Motion) -> Result<(), ActuatorError> {
        let (pattern, speed) = match motion {
            Motion::Forward(s) => ([true, false, true, false], s),
            Motion::Backward(s) => ([false, true, false, true], s),
            Motion::TurnLeft(s) => ([false, true, true, false], s),
            Motion::TurnRight(s) => ([true, false, false, true], s),
            Motion::Stop => ([false; 4], 0),
        };

        if speed == 0 {
            self.set_speed(0)?;
            self.set_pattern(pattern)?;
        } else {
            self.set_pattern(pattern)?;
            self.set_speed(speed)?;
        }
        self.motion = motion;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.apply(Motion::Stop)
    }

    fn set_speed(&mut self, speed: u8) -> Result<(), ActuatorError> {
        let speed = u16::from(speed);
        self.ena
            .set_duty_cycle_fraction(speed, 255)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.enb
            .set_duty_cycle_fraction(speed, 255)
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }

    fn set_pattern(&mut self, [a1, a2, b1, b2]: [bool; 4]) -> Result<(), ActuatorError> {
        write_pin(&mut self.in1, a1)?;
        write_pin(&mut self.in2, a2)?;
        write_pin(&mut self.in3, b1)?;
        write_pin(&mut self.in4, b2)
    }
}

fn write_pin<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), ActuatorError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| ActuatorError::GpioWriteFailed)
}
