//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  STARTUP ──[grace elapsed]──▶ SEEKING ──[IR L+R blocked, front < 15,
//!                                           not grabbed, IR not ignored]──▶ GRABBING
//!                                                                              │
//!                                                                   [maneuver done]
//!                                                                              ▼
//!                                                                       WALL_FOLLOWING ⟲
//! ```

use super::context::{ActuatorCommand, FsmContext, Motion, SonarFrame, Step};
use super::{StateDescriptor, StateId};
use crate::config::Thresholds;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Startup
        StateDescriptor {
            id: StateId::Startup,
            name: "Startup",
            on_enter: Some(startup_enter),
            on_exit: None,
            on_update: startup_update,
            on_done: None,
            resample_sonar: false,
        },
        // Index 1: Seeking
        StateDescriptor {
            id: StateId::Seeking,
            name: "Seeking",
            on_enter: Some(seeking_enter),
            on_exit: None,
            on_update: seeking_update,
            on_done: None,
            resample_sonar: false,
        },
        // Index 2: Grabbing
        StateDescriptor {
            id: StateId::Grabbing,
            name: "Grabbing",
            on_enter: Some(grabbing_enter),
            on_exit: Some(grabbing_exit),
            on_update: grabbing_update,
            on_done: Some(grabbing_done),
            resample_sonar: false,
        },
        // Index 3: WallFollowing
        StateDescriptor {
            id: StateId::WallFollowing,
            name: "WallFollowing",
            on_enter: Some(wall_following_enter),
            on_exit: None,
            on_update: wall_following_update,
            on_done: None,
            resample_sonar: true,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  STARTUP: blind forward drive while the sensors settle
// ═══════════════════════════════════════════════════════════════════════════

fn startup_enter(ctx: &mut FsmContext) {
    ctx.plan_forward("startup: forward");
    info!(
        "STARTUP: ignoring sensors for {} ms",
        ctx.config.timing.startup_grace_ms
    );
}

fn startup_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.in_startup_grace() {
        ctx.plan_forward("startup: forward");
        return None;
    }
    Some(StateId::Seeking)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SEEKING: drive forward until an object sits in the claw mouth
// ═══════════════════════════════════════════════════════════════════════════

fn seeking_enter(ctx: &mut FsmContext) {
    ctx.plan_forward("seeking: forward");
    info!("SEEKING: watching IR pair and front sonar");
}

fn seeking_update(ctx: &mut FsmContext) -> Option<StateId> {
    if grab_armed(ctx) {
        return Some(StateId::Grabbing);
    }
    if ctx.state.grabbed {
        return Some(StateId::WallFollowing);
    }
    ctx.plan_forward("seeking: forward");
    None
}

/// The four grab gates.  All must hold in the same cycle.
pub fn grab_armed(ctx: &FsmContext) -> bool {
    !ctx.state.grabbed
        && !ctx.ir_suppressed()
        && ctx.sensors.proximity.both_blocked()
        && ctx.sensors.sonar.front < ctx.config.thresholds.grab_trigger_cm
}

// ═══════════════════════════════════════════════════════════════════════════
//  GRABBING: committed approach, close, lift
// ═══════════════════════════════════════════════════════════════════════════

fn grabbing_enter(ctx: &mut FsmContext) {
    let timing = ctx.config.timing;
    let servos = ctx.config.servos;
    let speed = ctx.config.speeds.forward;
    ctx.plan(
        "grab sequence",
        &[
            Step::new(ActuatorCommand::Drive(Motion::Forward(speed)), timing.grab_approach_ms),
            Step::drive(Motion::Stop),
            Step::new(ActuatorCommand::Grab(servos.grab_closed), timing.grab_close_hold_ms),
            Step::new(ActuatorCommand::Lift(servos.lift_raised), timing.grab_lift_hold_ms),
        ],
    );
    info!(
        "GRABBING: front {:.1} cm, IR L+R blocked, running {} ms sequence",
        ctx.sensors.sonar.front,
        ctx.config.grab_sequence_ms()
    );
}

fn grabbing_exit(ctx: &mut FsmContext) {
    info!(
        "GRABBING: object held, grab trigger ignored until {} ms",
        ctx.state.ignore_ir_until_ms
    );
}

fn grabbing_update(_ctx: &mut FsmContext) -> Option<StateId> {
    // The maneuver is still pending; `grabbing_done` moves on.
    None
}

fn grabbing_done(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.state.grabbed = true;
    ctx.state.ignore_ir_until_ms = ctx.now_ms + ctx.config.timing.post_grab_ignore_ms;
    ctx.maneuver.clear();
    Some(StateId::WallFollowing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WALL_FOLLOWING: keep centred between walls, turn away from walls ahead
// ═══════════════════════════════════════════════════════════════════════════

/// Outcome of the wall-following cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallFollowDecision {
    /// Wall ahead, more room on the left.
    AvoidLeft,
    /// Wall ahead, more room on the right (or equal).
    AvoidRight,
    /// Side distances balanced.
    Centered,
    /// Drifted away from the right wall.
    CorrectRight,
    /// Drifted away from the left wall.
    CorrectLeft,
    /// Imbalance inside the dead band between tolerance and threshold.
    Default,
}

impl WallFollowDecision {
    pub fn label(self) -> &'static str {
        match self {
            Self::AvoidLeft => "wall ahead: turning left",
            Self::AvoidRight => "wall ahead: turning right",
            Self::Centered => "centered: forward",
            Self::CorrectRight => "too far from right wall: adjust right",
            Self::CorrectLeft => "too far from left wall: adjust left",
            Self::Default => "default: forward",
        }
    }
}

/// Ordered cascade, first match wins.
pub fn decide_wall_follow(sonar: &SonarFrame, t: &Thresholds) -> WallFollowDecision {
    if sonar.front < t.front_limit_cm {
        if sonar.left > sonar.right {
            WallFollowDecision::AvoidLeft
        } else {
            WallFollowDecision::AvoidRight
        }
    } else if (sonar.left - sonar.right).abs() <= t.centering_tolerance_cm {
        WallFollowDecision::Centered
    } else if sonar.left > sonar.right + t.imbalance_cm {
        WallFollowDecision::CorrectRight
    } else if sonar.right > sonar.left + t.imbalance_cm {
        WallFollowDecision::CorrectLeft
    } else {
        WallFollowDecision::Default
    }
}

fn wall_following_enter(_ctx: &mut FsmContext) {
    info!("WALL_FOLLOWING: tracking walls with side sonars");
}

fn wall_following_update(ctx: &mut FsmContext) -> Option<StateId> {
    let decision = decide_wall_follow(&ctx.sensors.sonar, &ctx.config.thresholds);
    let turn = ctx.config.speeds.turn;
    let timing = ctx.config.timing;
    let label = decision.label();
    debug!("WALL_FOLLOWING: {:?}", decision);

    match decision {
        WallFollowDecision::AvoidLeft => ctx.plan(
            label,
            &[
                Step::new(ActuatorCommand::Drive(Motion::TurnLeft(turn)), timing.obstacle_turn_ms),
                Step::drive(Motion::Stop),
            ],
        ),
        WallFollowDecision::AvoidRight => ctx.plan(
            label,
            &[
                Step::new(ActuatorCommand::Drive(Motion::TurnRight(turn)), timing.obstacle_turn_ms),
                Step::drive(Motion::Stop),
            ],
        ),
        WallFollowDecision::CorrectRight => ctx.plan(
            label,
            &[
                Step::new(ActuatorCommand::Drive(Motion::TurnRight(turn)), timing.correction_turn_ms),
                Step::drive(Motion::Stop),
            ],
        ),
        WallFollowDecision::CorrectLeft => ctx.plan(
            label,
            &[
                Step::new(ActuatorCommand::Drive(Motion::TurnLeft(turn)), timing.correction_turn_ms),
                Step::drive(Motion::Stop),
            ],
        ),
        WallFollowDecision::Centered | WallFollowDecision::Default => ctx.plan_forward(label),
    }
    None
}
