//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit for the IR modules' analog outputs
//! using raw ESP-IDF sys calls.  GPIO directions and LEDC timers are owned
//! by the typed `esp-idf-hal` drivers built in `main()`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::PinMap;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    /// GPIO has no ADC1 channel.
    NotAnAdcPin(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::NotAnAdcPin(gpio) => write!(f, "GPIO {} is not on ADC1", gpio),
        }
    }
}

/// ADC1 channel wired to `gpio` (ESP32-S3: GPIO1..=GPIO10 map to CH0..=CH9).
pub fn adc1_channel_for_gpio(gpio: i32) -> Result<u32, HwInitError> {
    match gpio {
        1..=10 => Ok((gpio - 1) as u32),
        _ => Err(HwInitError::NotAnAdcPin(gpio)),
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
pub fn init_peripherals(pins: &PinMap) -> Result<(), HwInitError> {
    let left = adc1_channel_for_gpio(pins.ir_left_adc)?;
    let right = adc1_channel_for_gpio(pins.ir_right_adc)?;
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc(&[left, right])?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(pins: &PinMap) -> Result<(), HwInitError> {
    adc1_channel_for_gpio(pins.ir_left_adc)?;
    adc1_channel_for_gpio(pins.ir_right_adc)?;
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// control-loop read path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(channels: &[u32]) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for &channel in channels {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }
    }

    info!("hw_init: ADC1 configured (IR channels {:?})", channels);
    Ok(())
}

/// Raw 12-bit sample; 0 when the read fails.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract; single-threaded control-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_ADC: [AtomicU16; 10] = [const { AtomicU16::new(0) }; 10];

/// Inject the value the next `adc1_read(channel)` returns on host builds.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    if let Some(slot) = SIM_ADC.get(channel as usize) {
        slot.store(raw, Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> u16 {
    SIM_ADC
        .get(channel as usize)
        .map_or(0, |slot| slot.load(Ordering::Relaxed))
}
