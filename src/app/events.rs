//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::fsm::StateId;
use crate::fsm::context::{ProximityReading, SonarFrame};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Initial pose applied; carries the initial state.
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The grab maneuver finished; re-triggering is suppressed until the
    /// given clock reading.
    GrabCompleted { ignore_ir_until_ms: u64 },

    /// Per-cycle diagnostic record.
    Cycle(CycleReport),
}

/// What one control cycle saw and decided.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub now_ms: u64,
    pub state: StateId,
    pub sonar: SonarFrame,
    pub proximity: ProximityReading,
    /// Name of the decision taken.
    pub branch: &'static str,
}
