//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  The drivers are
//! generic over `embedded_hal` traits, so the same adapter runs against
//! `esp-idf-hal` peripherals on target and mocks on host.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::motor::DualHBridge;
use crate::drivers::servo::Servo;
use crate::error::ActuatorError;
use crate::fsm::context::{Motion, ProximityReading, SonarFrame};
use crate::sensors::SensorHub;
use crate::sensors::ultrasonic::MicrosClock;

/// Concrete adapter that combines all hardware behind port traits.
///
/// Type parameters: sonar trigger `T` and echo `E` pins, IR input `P`,
/// sonar timebase `C`, motor enable PWM `EN`, motor input `IN`, servo
/// PWM `S`.
pub struct HardwareAdapter<T, E, P, C, EN, IN, S> {
    sensor_hub: SensorHub<T, E, P, C>,
    motors: DualHBridge<EN, IN>,
    grab: Servo<S>,
    lift: Servo<S>,
}

impl<T, E, P, C, EN, IN, S> HardwareAdapter<T, E, P, C, EN, IN, S>
where
    T: OutputPin,
    E: InputPin,
    P: InputPin,
    C: MicrosClock + DelayNs,
    EN: SetDutyCycle,
    IN: OutputPin,
    S: SetDutyCycle,
{
    pub fn new(
        sensor_hub: SensorHub<T, E, P, C>,
        motors: DualHBridge<EN, IN>,
        grab: Servo<S>,
        lift: Servo<S>,
    ) -> Self {
        Self {
            sensor_hub,
            motors,
            grab,
            lift,
        }
    }

    /// Current drive-train motion.
    pub fn motion(&self) -> Motion {
        self.motors.motion()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<T, E, P, C, EN, IN, S> SensorPort for HardwareAdapter<T, E, P, C, EN, IN, S>
where
    T: OutputPin,
    E: InputPin,
    P: InputPin,
    C: MicrosClock + DelayNs,
{
    fn read_sonar(&mut self) -> SonarFrame {
        self.sensor_hub.read_sonar()
    }

    fn read_proximity(&mut self) -> ProximityReading {
        self.sensor_hub.read_proximity()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<T, E, P, C, EN, IN, S> ActuatorPort for HardwareAdapter<T, E, P, C, EN, IN, S>
where
    EN: SetDutyCycle,
    IN: OutputPin,
    S: SetDutyCycle,
{
    fn drive_forward(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.motors.apply(Motion::Forward(speed))
    }

    fn drive_backward(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.motors.apply(Motion::Backward(speed))
    }

    fn turn_left(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.motors.apply(Motion::TurnLeft(speed))
    }

    fn turn_right(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.motors.apply(Motion::TurnRight(speed))
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.motors.stop()
    }

    fn set_grab_angle(&mut self, degrees: u16) -> Result<(), ActuatorError> {
        self.grab.set_angle(degrees)
    }

    fn set_lift_angle(&mut self, degrees: u16) -> Result<(), ActuatorError> {
        self.lift.set_angle(degrees)
    }
}
