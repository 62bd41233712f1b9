//! Robot configuration parameters.
//!
//! Every tunable of the controller lives here.  There is no persisted
//! configuration: [`RobotConfig::default()`] holds the values the firmware
//! is built with, and the active set is dumped to the log at boot.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::pins;

/// Distance thresholds (centimetres) used by the navigation state machine.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Thresholds {
    /// Obstacle straight ahead while wall-following.
    pub front_limit_cm: f32,
    /// Front distance under which the grab may trigger.
    pub grab_trigger_cm: f32,
    /// Side readings within this of each other count as centred.
    pub centering_tolerance_cm: f32,
    /// Side imbalance that triggers a steering correction.
    pub imbalance_cm: f32,
    /// Nominal wall clearance margin.
    pub wall_distance_cm: f32,
    /// Reported when no echo returns.
    pub sentinel_cm: f32,
}

/// Motor power levels on the 0 – 255 PWM scale.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Speeds {
    pub forward: u8,
    pub turn: u8,
}

/// Durations (milliseconds) of timed phases and holds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Timing {
    /// Sensors are ignored and the robot drives forward for this long after boot.
    pub startup_grace_ms: u64,
    /// Grab re-trigger suppression after a completed grab.
    pub post_grab_ignore_ms: u64,
    /// Forward approach at the start of the grab.
    pub grab_approach_ms: u32,
    /// Hold after closing the claw.
    pub grab_close_hold_ms: u32,
    /// Hold after raising the arm.
    pub grab_lift_hold_ms: u32,
    /// Turn away from a wall ahead.
    pub obstacle_turn_ms: u32,
    /// Steering correction pulse.
    pub correction_turn_ms: u32,
    /// Echo wait budget per ultrasonic measurement.
    pub echo_timeout_us: u32,
}

/// Servo set-points in degrees.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServoAngles {
    pub grab_open: u16,
    /// Exceeds the usual 0 – 180° travel; the servo driver clamps it.
    pub grab_closed: u16,
    pub lift_lowered: u16,
    pub lift_raised: u16,
    /// Mechanical travel of the fitted servos.
    pub travel_max: u16,
}

/// GPIO assignment for every channel the controller drives or samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinMap {
    pub motor_left_en: i32,
    pub motor_left_in1: i32,
    pub motor_left_in2: i32,
    pub motor_right_in3: i32,
    pub motor_right_in4: i32,
    pub motor_right_en: i32,
    pub servo_grab: i32,
    pub servo_lift: i32,
    /// (trigger, echo) pairs in acquisition order.
    pub sonar_front: (i32, i32),
    pub sonar_left: (i32, i32),
    pub sonar_right: (i32, i32),
    pub ir_left: i32,
    pub ir_right: i32,
    pub ir_left_adc: i32,
    pub ir_right_adc: i32,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            motor_left_en: pins::MOTOR_LEFT_EN_GPIO,
            motor_left_in1: pins::MOTOR_LEFT_IN1_GPIO,
            motor_left_in2: pins::MOTOR_LEFT_IN2_GPIO,
            motor_right_in3: pins::MOTOR_RIGHT_IN3_GPIO,
            motor_right_in4: pins::MOTOR_RIGHT_IN4_GPIO,
            motor_right_en: pins::MOTOR_RIGHT_EN_GPIO,
            servo_grab: pins::SERVO_GRAB_GPIO,
            servo_lift: pins::SERVO_LIFT_GPIO,
            sonar_front: (pins::SONAR_FRONT_TRIG_GPIO, pins::SONAR_FRONT_ECHO_GPIO),
            sonar_left: (pins::SONAR_LEFT_TRIG_GPIO, pins::SONAR_LEFT_ECHO_GPIO),
            sonar_right: (pins::SONAR_RIGHT_TRIG_GPIO, pins::SONAR_RIGHT_ECHO_GPIO),
            ir_left: pins::IR_LEFT_GPIO,
            ir_right: pins::IR_RIGHT_GPIO,
            ir_left_adc: pins::IR_LEFT_ADC_GPIO,
            ir_right_adc: pins::IR_RIGHT_ADC_GPIO,
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RobotConfig {
    pub thresholds: Thresholds,
    pub speeds: Speeds,
    pub timing: Timing,
    pub servos: ServoAngles,
    pub pins: PinMap,
    /// Target period of one sense → decide → act cycle.
    pub control_loop_interval_ms: u32,
    /// Task watchdog timeout; must outlast the grab sequence.
    pub watchdog_timeout_ms: u32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds {
                front_limit_cm: 10.0,
                grab_trigger_cm: 15.0,
                centering_tolerance_cm: 1.5,
                imbalance_cm: 2.0,
                wall_distance_cm: 10.0,
                sentinel_cm: 400.0,
            },
            speeds: Speeds {
                forward: 100,
                turn: 90,
            },
            timing: Timing {
                startup_grace_ms: 2_000,
                post_grab_ignore_ms: 8_000,
                grab_approach_ms: 2_000,
                grab_close_hold_ms: 800,
                grab_lift_hold_ms: 1_000,
                obstacle_turn_ms: 300,
                correction_turn_ms: 150,
                echo_timeout_us: 20_000,
            },
            servos: ServoAngles {
                grab_open: 0,
                grab_closed: 200,
                lift_lowered: 0,
                lift_raised: 45,
                travel_max: 180,
            },
            pins: PinMap::default(),
            control_loop_interval_ms: 100,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl RobotConfig {
    /// Total blocking time of the grab maneuver.
    pub fn grab_sequence_ms(&self) -> u32 {
        self.timing.grab_approach_ms + self.timing.grab_close_hold_ms + self.timing.grab_lift_hold_ms
    }

    /// Reject combinations the state machine cannot act on sensibly.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.front_limit_cm <= 0.0 || t.grab_trigger_cm <= 0.0 {
            return Err(Error::Config("distance thresholds must be positive"));
        }
        if t.front_limit_cm > t.grab_trigger_cm {
            return Err(Error::Config("front limit must not exceed the grab trigger"));
        }
        if t.sentinel_cm <= t.grab_trigger_cm {
            return Err(Error::Config("sentinel must read as far, beyond the grab trigger"));
        }
        if t.centering_tolerance_cm >= t.imbalance_cm {
            return Err(Error::Config("centering tolerance must be below the imbalance threshold"));
        }
        if self.speeds.forward == 0 || self.speeds.turn == 0 {
            return Err(Error::Config("speeds must be non-zero"));
        }
        if self.servos.travel_max == 0 {
            return Err(Error::Config("servo travel must be non-zero"));
        }
        if self.timing.echo_timeout_us == 0 {
            return Err(Error::Config("echo timeout must be non-zero"));
        }
        if self.watchdog_timeout_ms <= self.grab_sequence_ms() {
            return Err(Error::Config("watchdog timeout shorter than the grab sequence"));
        }
        Ok(())
    }
}
