//! ESP32 time adapter.
//!
//! Provides monotonic time and blocking delays for the controller.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic);
//!   delays yield to FreeRTOS for whole milliseconds and busy-wait the rest.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` and
//!   `std::thread::sleep` for host-side simulation.

use embedded_hal::delay::DelayNs;

use crate::app::ports::ClockPort;
use crate::sensors::ultrasonic::MicrosClock;

/// Time adapter for the ESP32-S3 platform.
#[derive(Clone)]
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

impl ClockPort for Esp32TimeAdapter {
    fn now_ms(&self) -> u64 {
        self.uptime_ms()
    }
}

impl MicrosClock for Esp32TimeAdapter {
    fn now_us(&self) -> u64 {
        self.uptime_us()
    }
}

#[cfg(target_os = "espidf")]
impl DelayNs for Esp32TimeAdapter {
    fn delay_ns(&mut self, ns: u32) {
        let us = ns.div_ceil(1_000);
        if us >= 1_000 {
            esp_idf_svc::hal::delay::FreeRtos::delay_ms(us / 1_000);
        }
        esp_idf_svc::hal::delay::Ets::delay_us(us % 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayNs for Esp32TimeAdapter {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}
