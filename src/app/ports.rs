//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, clocks, event sinks) implement
//! these traits.  The [`ControlLoop`](super::service::ControlLoop) consumes
//! them via generics, so the domain core never touches hardware directly.

use crate::error::ActuatorError;
use crate::fsm::context::{ProximityReading, SonarFrame};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Measure front, left, right.  Channels without an echo report the
    /// sentinel distance.
    fn read_sonar(&mut self) -> SonarFrame;

    /// Sample both IR modules (digital + analog).
    fn read_proximity(&mut self) -> ProximityReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
///
/// Speeds are 0 – 255 PWM duty, angles are degrees.  Every command takes
/// effect immediately; timing is the caller's business.
pub trait ActuatorPort {
    fn drive_forward(&mut self, speed: u8) -> Result<(), ActuatorError>;

    fn drive_backward(&mut self, speed: u8) -> Result<(), ActuatorError>;

    /// Spin in place: left motor backward, right motor forward.
    fn turn_left(&mut self, speed: u8) -> Result<(), ActuatorError>;

    /// Spin in place: left motor forward, right motor backward.
    fn turn_right(&mut self, speed: u8) -> Result<(), ActuatorError>;

    /// Both motors unpowered.
    fn stop(&mut self) -> Result<(), ActuatorError>;

    fn set_grab_angle(&mut self, degrees: u16) -> Result<(), ActuatorError>;

    fn set_lift_angle(&mut self, degrees: u16) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: system timer → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
