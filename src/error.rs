//! Unified error types for the WallGrip firmware.
//!
//! Driver-level `SensorError` and `ActuatorError` are `Copy` so they pass
//! through the sensor hub and control loop without allocation.  The
//! navigation state machine never sees them: sensor errors are turned into
//! the sentinel distance by the hub, and actuator errors are logged by the
//! control loop.  The top-level `Error` reports a rejected configuration.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Firmware error surfaced to `main` at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No echo pulse completed inside the measurement window.
    EchoTimeout,
    /// GPIO input read returned an error.
    GpioReadFailed,
    /// Driving the trigger pin failed.
    GpioWriteFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EchoTimeout => write!(f, "echo timeout"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// Direction pin set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
