//! GPIO / peripheral pin assignments for the WallGrip main board.
//!
//! Single source of truth for [`PinMap::default()`](crate::config::PinMap).
//! Drivers never hard-code pin numbers; they receive them through the
//! configured pin map so a re-wired chassis only touches this file.

// ---------------------------------------------------------------------------
// Drive motors (L298N dual H-bridge)
// ---------------------------------------------------------------------------

/// LEDC PWM output: left motor enable (ENA).
pub const MOTOR_LEFT_EN_GPIO: i32 = 4;
/// Left motor direction inputs (IN1 / IN2).
pub const MOTOR_LEFT_IN1_GPIO: i32 = 5;
pub const MOTOR_LEFT_IN2_GPIO: i32 = 6;
/// Right motor direction inputs (IN3 / IN4).
pub const MOTOR_RIGHT_IN3_GPIO: i32 = 7;
pub const MOTOR_RIGHT_IN4_GPIO: i32 = 15;
/// LEDC PWM output: right motor enable (ENB).
pub const MOTOR_RIGHT_EN_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Gripper servos
// ---------------------------------------------------------------------------

/// Claw open/close servo signal.
pub const SERVO_GRAB_GPIO: i32 = 17;
/// Arm raise/lower servo signal.
pub const SERVO_LIFT_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Ultrasonic rangers (HC-SR04): trigger is an output, echo an input
// ---------------------------------------------------------------------------

pub const SONAR_FRONT_TRIG_GPIO: i32 = 11;
pub const SONAR_FRONT_ECHO_GPIO: i32 = 12;
pub const SONAR_LEFT_TRIG_GPIO: i32 = 13;
pub const SONAR_LEFT_ECHO_GPIO: i32 = 14;
pub const SONAR_RIGHT_TRIG_GPIO: i32 = 21;
pub const SONAR_RIGHT_ECHO_GPIO: i32 = 47;

// ---------------------------------------------------------------------------
// IR proximity modules: digital out is LOW when an object is present
// ---------------------------------------------------------------------------

pub const IR_LEFT_GPIO: i32 = 38;
pub const IR_RIGHT_GPIO: i32 = 39;

/// Analog IR outputs on ADC1 (GPIO 1 / GPIO 2 on ESP32-S3).
/// Diagnostic only; no decision reads them.
pub const IR_LEFT_ADC_GPIO: i32 = 1;
pub const IR_RIGHT_ADC_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC resolution for the motor enables.  8-bit gives the 0 – 255 power range.
pub const MOTOR_PWM_RESOLUTION_BITS: u32 = 8;
/// Motor PWM frequency (1 kHz, L298N friendly).
pub const MOTOR_PWM_FREQ_HZ: u32 = 1_000;
/// Hobby servo frame rate (20 ms period).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Servo LEDC resolution; 14 bits gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
