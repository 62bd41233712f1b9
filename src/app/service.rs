//! Control loop service: the hexagonal core.
//!
//! [`ControlLoop`] owns the FSM and its shared context.  It exposes a
//! hardware-agnostic sense → decide → act cycle.  All I/O flows through
//! port traits injected at call sites, making the whole controller
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │      ControlLoop       │
//! ActuatorPort ◀──│  FSM · maneuvers       │ ◀── ClockPort + DelayNs
//!                 └────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::RobotConfig;
use crate::fsm::context::{ActuatorCommand, ControllerState, FsmContext, Motion, SensorSnapshot};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::events::{AppEvent, CycleReport};
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

/// Orchestrates sensing, the navigation FSM and actuation.
pub struct ControlLoop {
    fsm: Fsm,
    ctx: FsmContext,
    cycle_count: u64,
}

impl ControlLoop {
    /// Construct the controller anchored at `start_time_ms`.
    ///
    /// Does **not** touch hardware: call [`start`](Self::start) next.
    pub fn new(config: RobotConfig, start_time_ms: u64) -> Self {
        let ctx = FsmContext::new(config, start_time_ms);
        let fsm = Fsm::new(build_state_table(), StateId::Startup);
        Self {
            fsm,
            ctx,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Apply the initial pose (motors stopped, claw open, arm lowered)
    /// and enter the initial state.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let servos = self.ctx.config.servos;
        report(hw.stop(), "stop");
        report(hw.set_grab_angle(servos.grab_open), "grab home");
        report(hw.set_lift_angle(servos.lift_lowered), "lift home");

        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("System initialized in {:?}", self.fsm.current_state());
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle: read sensors → FSM → execute maneuver.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; `time` supplies the cycle clock and the blocking
    /// holds between maneuver steps.
    pub fn cycle(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        time: &mut (impl ClockPort + DelayNs),
        sink: &mut impl EventSink,
    ) {
        self.cycle_count += 1;
        let prev_state = self.fsm.current_state();
        self.ctx.now_ms = time.now_ms();

        // 1. Sense (blacked out during the startup grace).  Wall following
        //    decides on a second sonar frame taken after the first.
        if !self.ctx.in_startup_grace() {
            self.ctx.sensors.proximity = hw.read_proximity();
            self.ctx.sensors.sonar = hw.read_sonar();
            if self.fsm.resamples_sonar() {
                self.ctx.sensors.sonar = hw.read_sonar();
            }
        }

        // 2. Decide
        self.fsm.tick(&mut self.ctx);

        let decided = self.fsm.current_state();
        if decided != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: decided,
            });
        }
        sink.emit(&AppEvent::Cycle(CycleReport {
            cycle: self.cycle_count,
            now_ms: self.ctx.now_ms,
            state: decided,
            sonar: self.ctx.sensors.sonar,
            proximity: self.ctx.sensors.proximity,
            branch: self.ctx.branch,
        }));

        // 3. Act
        if self.ctx.maneuver.is_empty() {
            return;
        }
        self.execute_maneuver(hw, time);

        let was_grabbed = self.ctx.state.grabbed;
        self.ctx.now_ms = time.now_ms();
        self.fsm.maneuver_complete(&mut self.ctx);

        if self.ctx.state.grabbed && !was_grabbed {
            sink.emit(&AppEvent::GrabCompleted {
                ignore_ir_until_ms: self.ctx.state.ignore_ir_until_ms,
            });
        }
        let settled = self.fsm.current_state();
        if settled != decided {
            sink.emit(&AppEvent::StateChanged {
                from: decided,
                to: settled,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Controller latches (grabbed flag, suppression deadline, start time).
    pub fn controller_state(&self) -> ControllerState {
        self.ctx.state
    }

    /// Sensor data the last decision was based on.
    pub fn sensors(&self) -> SensorSnapshot {
        self.ctx.sensors
    }

    /// Name of the last decision taken.
    pub fn branch(&self) -> &'static str {
        self.ctx.branch
    }

    /// Total control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn config(&self) -> &RobotConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate the planned maneuver into port calls, blocking for each
    /// step's hold.  A failed command is logged and the sequence goes on.
    fn execute_maneuver(&self, hw: &mut impl ActuatorPort, delay: &mut impl DelayNs) {
        for step in &self.ctx.maneuver {
            let result = match step.command {
                ActuatorCommand::Drive(Motion::Forward(s)) => hw.drive_forward(s),
                ActuatorCommand::Drive(Motion::Backward(s)) => hw.drive_backward(s),
                ActuatorCommand::Drive(Motion::TurnLeft(s)) => hw.turn_left(s),
                ActuatorCommand::Drive(Motion::TurnRight(s)) => hw.turn_right(s),
                ActuatorCommand::Drive(Motion::Stop) => hw.stop(),
                ActuatorCommand::Grab(deg) => hw.set_grab_angle(deg),
                ActuatorCommand::Lift(deg) => hw.set_lift_angle(deg),
            };
            if let Err(e) = result {
                warn!("actuator command {:?} failed: {}", step.command, e);
            }
            if step.hold_ms > 0 {
                delay.delay_ms(step.hold_ms);
            }
        }
    }
}

fn report(result: Result<(), crate::error::ActuatorError>, what: &str) {
    if let Err(e) = result {
        warn!("initial pose: {} failed: {}", what, e);
    }
}

/// Milliseconds left of a `period_ms` cycle that began at `cycle_start_ms`;
/// zero once the cycle has overrun.
pub fn remaining_in_period(cycle_start_ms: u64, now_ms: u64, period_ms: u32) -> u64 {
    let elapsed = now_ms.saturating_sub(cycle_start_ms);
    u64::from(period_ms).saturating_sub(elapsed)
}
