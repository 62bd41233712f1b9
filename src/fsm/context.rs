//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the cycle's sensor snapshot, the controller latches, the
//! maneuver to execute, timing and configuration.  Think of it as the
//! "blackboard" in a blackboard architecture.

use heapless::Vec;

use crate::config::RobotConfig;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to state handlers; written by the sensor hub)
// ---------------------------------------------------------------------------

/// Front/left/right ultrasonic distances (cm) of one cycle.
///
/// A failed measurement is already the sentinel distance here, never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SonarFrame {
    pub front: f32,
    pub left: f32,
    pub right: f32,
}

impl SonarFrame {
    /// Every channel reads "no obstacle".
    pub const fn clear(sentinel_cm: f32) -> Self {
        Self {
            front: sentinel_cm,
            left: sentinel_cm,
            right: sentinel_cm,
        }
    }
}

impl Default for SonarFrame {
    fn default() -> Self {
        Self::clear(400.0)
    }
}

/// IR proximity state of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProximityReading {
    /// Left digital output LOW.
    pub left_blocked: bool,
    /// Right digital output LOW.
    pub right_blocked: bool,
    /// Raw ADC of the left module (diagnostic only).
    pub left_analog: u16,
    /// Raw ADC of the right module (diagnostic only).
    pub right_analog: u16,
}

impl ProximityReading {
    pub fn both_blocked(&self) -> bool {
        self.left_blocked && self.right_blocked
    }
}

/// Everything sensed in one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    pub sonar: SonarFrame,
    pub proximity: ProximityReading,
}

// ---------------------------------------------------------------------------
// Controller latches
// ---------------------------------------------------------------------------

/// Process-lifetime controller state, written only by state handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerState {
    /// Set once when the grab maneuver completes; never cleared.
    pub grabbed: bool,
    /// Grab re-triggering is suppressed while `now <= ignore_ir_until_ms`.
    pub ignore_ir_until_ms: u64,
    /// Clock reading at initialisation; anchors the startup grace window.
    pub start_time_ms: u64,
}

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; executed by the control loop)
// ---------------------------------------------------------------------------

/// Drive-train motion at a PWM power level (0 – 255).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Forward(u8),
    Backward(u8),
    TurnLeft(u8),
    TurnRight(u8),
    Stop,
}

/// A single actuator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    Drive(Motion),
    /// Claw servo angle in degrees.
    Grab(u16),
    /// Arm servo angle in degrees.
    Lift(u16),
}

/// One step of a maneuver: issue `command`, then block for `hold_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub command: ActuatorCommand,
    pub hold_ms: u32,
}

impl Step {
    pub const fn new(command: ActuatorCommand, hold_ms: u32) -> Self {
        Self { command, hold_ms }
    }

    pub const fn drive(motion: Motion) -> Self {
        Self::new(ActuatorCommand::Drive(motion), 0)
    }
}

/// Longest maneuver the handlers build (the grab sequence).
pub const MANEUVER_CAP: usize = 6;

/// Ordered steps executed to completion within one cycle.
pub type Maneuver = Vec<Step, MANEUVER_CAP>;

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Clock reading for the current cycle (ms since boot).
    pub now_ms: u64,

    // -- Sensor data --
    /// Latest sensor readings.  Refreshed before each FSM tick.
    pub sensors: SensorSnapshot,

    // -- Latches --
    pub state: ControllerState,

    // -- Actuator outputs --
    /// Steps to execute after the FSM tick.  Handlers replace it wholesale.
    pub maneuver: Maneuver,
    /// Name of the decision taken this cycle, for the diagnostic line.
    pub branch: &'static str,

    // -- Configuration --
    pub config: RobotConfig,
}

impl FsmContext {
    /// Create a new context anchored at `start_time_ms`.
    pub fn new(config: RobotConfig, start_time_ms: u64) -> Self {
        Self {
            now_ms: start_time_ms,
            sensors: SensorSnapshot {
                sonar: SonarFrame::clear(config.thresholds.sentinel_cm),
                proximity: ProximityReading::default(),
            },
            state: ControllerState {
                start_time_ms,
                ..ControllerState::default()
            },
            maneuver: Maneuver::new(),
            branch: "",
            config,
        }
    }

    /// Milliseconds since initialisation (saturating on a clock step back).
    pub fn elapsed_since_start_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.state.start_time_ms)
    }

    /// True while the post-boot sensor blackout applies.
    pub fn in_startup_grace(&self) -> bool {
        self.elapsed_since_start_ms() < self.config.timing.startup_grace_ms
    }

    /// True while a completed grab still suppresses re-triggering.
    pub fn ir_suppressed(&self) -> bool {
        self.now_ms <= self.state.ignore_ir_until_ms
    }

    /// Replace the pending maneuver with `steps` and record the branch name.
    pub fn plan(&mut self, branch: &'static str, steps: &[Step]) {
        self.branch = branch;
        self.maneuver.clear();
        for step in steps {
            if self.maneuver.push(*step).is_err() {
                debug_assert!(false, "maneuver exceeds {MANEUVER_CAP} steps");
                break;
            }
        }
    }

    /// Plan plain forward motion at standard speed.
    pub fn plan_forward(&mut self, branch: &'static str) {
        let speed = self.config.speeds.forward;
        self.plan(branch, &[Step::drive(Motion::Forward(speed))]);
    }
}
