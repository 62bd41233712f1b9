//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements            | Connects to                  |
//! |------------|-----------------------|------------------------------|
//! | `hardware` | SensorPort            | HC-SR04 rangers, IR modules  |
//! |            | ActuatorPort          | L298N bridge, servos         |
//! | `log_sink` | EventSink             | Serial log output            |
//! | `time`     | ClockPort, DelayNs    | ESP32 system timer           |

pub mod hardware;
pub mod log_sink;
pub mod time;
