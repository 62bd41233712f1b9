//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod motor;
pub mod servo;
pub mod watchdog;
