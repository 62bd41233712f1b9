//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.  Sensor readings are
//! scripted by the test.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use wallgrip::app::events::AppEvent;
use wallgrip::app::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use wallgrip::error::ActuatorError;
use wallgrip::fsm::StateId;
use wallgrip::fsm::context::{ProximityReading, SonarFrame};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Forward(u8),
    Backward(u8),
    TurnLeft(u8),
    TurnRight(u8),
    Stop,
    Grab(u16),
    Lift(u16),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub sonar: SonarFrame,
    /// Frames returned by the next sonar reads, ahead of `sonar`.
    pub sonar_script: VecDeque<SonarFrame>,
    pub proximity: ProximityReading,
    pub sonar_reads: u32,
    pub proximity_reads: u32,
    /// Order in which the two sensor groups were sampled.
    pub read_order: Vec<&'static str>,
    pub calls: Vec<ActuatorCall>,
    /// Servo commands are recorded but report a PWM failure.
    pub fail_servos: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            sonar: SonarFrame::clear(400.0),
            sonar_script: VecDeque::new(),
            proximity: ProximityReading::default(),
            sonar_reads: 0,
            proximity_reads: 0,
            read_order: Vec::new(),
            calls: Vec::new(),
            fail_servos: false,
        }
    }

    pub fn set_sonar(&mut self, front: f32, left: f32, right: f32) {
        self.sonar = SonarFrame { front, left, right };
    }

    /// Queue one frame for a single upcoming sonar read.
    pub fn script_sonar(&mut self, front: f32, left: f32, right: f32) {
        self.sonar_script.push_back(SonarFrame { front, left, right });
    }

    /// `true` = that side's digital output is LOW (object present).
    pub fn set_ir(&mut self, left_blocked: bool, right_blocked: bool) {
        self.proximity.left_blocked = left_blocked;
        self.proximity.right_blocked = right_blocked;
    }

    pub fn last_call(&self) -> Option<ActuatorCall> {
        self.calls.last().copied()
    }

    pub fn grab_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Grab(a) if *a > 0))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn servo(&mut self, call: ActuatorCall) -> Result<(), ActuatorError> {
        self.calls.push(call);
        if self.fail_servos {
            Err(ActuatorError::PwmWriteFailed)
        } else {
            Ok(())
        }
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_sonar(&mut self) -> SonarFrame {
        self.sonar_reads += 1;
        self.read_order.push("sonar");
        self.sonar_script.pop_front().unwrap_or(self.sonar)
    }

    fn read_proximity(&mut self) -> ProximityReading {
        self.proximity_reads += 1;
        self.read_order.push("ir");
        self.proximity
    }
}

impl ActuatorPort for MockHardware {
    fn drive_forward(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Forward(speed));
        Ok(())
    }

    fn drive_backward(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Backward(speed));
        Ok(())
    }

    fn turn_left(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::TurnLeft(speed));
        Ok(())
    }

    fn turn_right(&mut self, speed: u8) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::TurnRight(speed));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Stop);
        Ok(())
    }

    fn set_grab_angle(&mut self, degrees: u16) -> Result<(), ActuatorError> {
        self.servo(ActuatorCall::Grab(degrees))
    }

    fn set_lift_angle(&mut self, degrees: u16) -> Result<(), ActuatorError> {
        self.servo(ActuatorCall::Lift(degrees))
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Manually stepped millisecond clock that records every blocking hold.
pub struct MockClock {
    pub now: u64,
    /// When set, holds advance `now` like real time would.
    pub advance_on_delay: bool,
    pub holds: Vec<u32>,
}

#[allow(dead_code)]
impl MockClock {
    /// Frozen at `now`; holds are recorded but take no time.
    pub fn fixed(now: u64) -> Self {
        Self {
            now,
            advance_on_delay: false,
            holds: Vec::new(),
        }
    }

    pub fn running(now: u64) -> Self {
        Self {
            advance_on_delay: true,
            ..Self::fixed(now)
        }
    }

    pub fn total_hold_ms(&self) -> u32 {
        self.holds.iter().sum()
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        if self.advance_on_delay {
            self.now += u64::from(ns / 1_000_000);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.holds.push(ms);
        if self.advance_on_delay {
            self.now += u64::from(ms);
        }
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Event sink that keeps every event for later inspection.
#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<(StateId, StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn branches(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Cycle(r) => Some(r.branch),
                _ => None,
            })
            .collect()
    }

    pub fn grab_completions(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::GrabCompleted { ignore_ir_until_ms } => Some(*ignore_ir_until_ms),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
