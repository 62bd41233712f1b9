//! WallGrip Firmware: Main Entry Point
//!
//! Hexagonal architecture with a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink        Esp32TimeAdapter   │
//! │  (Sensor+Actuator)      (EventSink)         (Clock+Delay)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Startup · Seeking · Grabbing · WallFollowing          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow, bail};
use embedded_hal::delay::DelayNs;
use esp_idf_svc::hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::ledc::config::TimerConfig;
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use log::info;

use wallgrip::adapters::hardware::HardwareAdapter;
use wallgrip::adapters::log_sink::LogEventSink;
use wallgrip::adapters::time::Esp32TimeAdapter;
use wallgrip::app::ports::ClockPort;
use wallgrip::app::service::{ControlLoop, remaining_in_period};
use wallgrip::config::RobotConfig;
use wallgrip::drivers::hw_init;
use wallgrip::drivers::motor::DualHBridge;
use wallgrip::drivers::servo::Servo;
use wallgrip::drivers::watchdog::Watchdog;
use wallgrip::pins;
use wallgrip::sensors::SensorHub;
use wallgrip::sensors::proximity::ProximityDetector;
use wallgrip::sensors::ultrasonic::UltrasonicSensor;

fn resolution(bits: u32) -> Result<Resolution> {
    Ok(match bits {
        8 => Resolution::Bits8,
        10 => Resolution::Bits10,
        14 => Resolution::Bits14,
        other => bail!("unsupported LEDC resolution: {} bits", other),
    })
}

// SAFETY (all three): pin numbers come from the validated pin map, each
// GPIO is claimed exactly once below, and nothing else in the firmware
// takes these pins from `Peripherals`.
fn output(gpio: i32) -> Result<PinDriver<'static, AnyOutputPin, esp_idf_svc::hal::gpio::Output>> {
    Ok(PinDriver::output(unsafe { AnyOutputPin::new(gpio) })?)
}

fn input(gpio: i32) -> Result<PinDriver<'static, AnyInputPin, esp_idf_svc::hal::gpio::Input>> {
    Ok(PinDriver::input(unsafe { AnyInputPin::new(gpio) })?)
}

fn pwm_pin(gpio: i32) -> AnyOutputPin {
    unsafe { AnyOutputPin::new(gpio) }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WallGrip v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = RobotConfig::default();
    config.validate()?;
    info!("Config: {}", serde_json::to_string(&config)?);
    let p = config.pins;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals(&p).map_err(|e| anyhow!("HAL init failed: {}", e))?;
    let peripherals = Peripherals::take()?;

    let motor_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(pins::MOTOR_PWM_FREQ_HZ))
            .resolution(resolution(pins::MOTOR_PWM_RESOLUTION_BITS)?),
    )?;
    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer1,
        &TimerConfig::default()
            .frequency(Hertz(pins::SERVO_PWM_FREQ_HZ))
            .resolution(resolution(pins::SERVO_PWM_RESOLUTION_BITS)?),
    )?;

    let motors = DualHBridge::new(
        LedcDriver::new(peripherals.ledc.channel0, &motor_timer, pwm_pin(p.motor_left_en))?,
        output(p.motor_left_in1)?,
        output(p.motor_left_in2)?,
        output(p.motor_right_in3)?,
        output(p.motor_right_in4)?,
        LedcDriver::new(peripherals.ledc.channel1, &motor_timer, pwm_pin(p.motor_right_en))?,
    );
    let travel = config.servos.travel_max;
    let grab = Servo::new(
        "grab",
        LedcDriver::new(peripherals.ledc.channel2, &servo_timer, pwm_pin(p.servo_grab))?,
        travel,
    );
    let lift = Servo::new(
        "lift",
        LedcDriver::new(peripherals.ledc.channel3, &servo_timer, pwm_pin(p.servo_lift))?,
        travel,
    );

    let t = &config.timing;
    let sentinel = config.thresholds.sentinel_cm;
    let sonar = |label, (trig, echo): (i32, i32)| -> Result<_> {
        Ok(UltrasonicSensor::new(label, output(trig)?, input(echo)?, t.echo_timeout_us, sentinel))
    };
    let proximity = ProximityDetector::new(input(p.ir_left)?, input(p.ir_right)?, p.ir_left_adc, p.ir_right_adc)
        .map_err(|e| anyhow!("IR init failed: {}", e))?;

    let mut time = Esp32TimeAdapter::new();
    let hub = SensorHub::new(
        sonar("front", p.sonar_front)?,
        sonar("left", p.sonar_left)?,
        sonar("right", p.sonar_right)?,
        proximity,
        time.clone(),
    );
    let mut hw = HardwareAdapter::new(hub, motors, grab, lift);
    let mut sink = LogEventSink::new();

    // ── 4. Controller ─────────────────────────────────────────
    let interval = config.control_loop_interval_ms;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let mut app = ControlLoop::new(config, time.now_ms());
    app.start(&mut hw, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let cycle_start = time.now_ms();
        app.cycle(&mut hw, &mut time, &mut sink);
        watchdog.feed();

        let rest = remaining_in_period(cycle_start, time.now_ms(), interval);
        if rest > 0 {
            time.delay_ms(rest as u32);
        }
    }
}
