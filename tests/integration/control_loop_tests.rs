//! Integration tests for the ControlLoop → FSM → actuators pipeline.
//!
//! These run on the host (x86_64) and drive whole control cycles against
//! mock hardware and a manually stepped clock.

use crate::mock_hw::{ActuatorCall, LogSink, MockClock, MockHardware};

use wallgrip::app::events::AppEvent;
use wallgrip::app::service::ControlLoop;
use wallgrip::config::RobotConfig;
use wallgrip::fsm::StateId;

fn make_app() -> (ControlLoop, MockHardware, LogSink) {
    let mut app = ControlLoop::new(RobotConfig::default(), 0);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    hw.clear_calls();
    (app, hw, sink)
}

/// Object in the claw mouth: both IR LOW, front under the trigger.
fn object_ahead(hw: &mut MockHardware) {
    hw.set_ir(true, true);
    hw.set_sonar(10.0, 400.0, 400.0);
}

/// Run one cycle at a frozen `now`.
fn cycle_at(app: &mut ControlLoop, hw: &mut MockHardware, sink: &mut LogSink, now: u64) -> MockClock {
    let mut clock = MockClock::fixed(now);
    app.cycle(hw, &mut clock, sink);
    clock
}

// ── Initialisation ────────────────────────────────────────────

#[test]
fn start_applies_initial_pose() {
    let mut app = ControlLoop::new(RobotConfig::default(), 0);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);

    assert_eq!(
        hw.calls,
        vec![ActuatorCall::Stop, ActuatorCall::Grab(0), ActuatorCall::Lift(0)]
    );
    assert!(matches!(sink.events.as_slice(), [AppEvent::Started(StateId::Startup)]));
    assert_eq!(app.state(), StateId::Startup);
}

// ── Startup grace ─────────────────────────────────────────────

#[test]
fn startup_drives_forward_whatever_the_sensors_say() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_ir(true, true);
    hw.set_sonar(0.0, 0.0, 0.0);

    for now in [0, 500, 1_000, 1_999] {
        cycle_at(&mut app, &mut hw, &mut sink, now);
        assert_eq!(hw.last_call(), Some(ActuatorCall::Forward(100)), "at {now} ms");
        assert_eq!(app.state(), StateId::Startup);
    }
    assert_eq!(hw.sonar_reads, 0, "sensors are not sampled during the grace");
    assert_eq!(hw.proximity_reads, 0);
    assert_eq!(hw.grab_count(), 0);
}

#[test]
fn grace_ends_exactly_at_two_seconds() {
    let (mut app, mut hw, mut sink) = make_app();
    cycle_at(&mut app, &mut hw, &mut sink, 2_000);
    assert_eq!(app.state(), StateId::Seeking);
    assert_eq!(sink.transitions(), vec![(StateId::Startup, StateId::Seeking)]);
    assert_eq!(hw.last_call(), Some(ActuatorCall::Forward(100)));
}

#[test]
fn seeking_reads_sensors_once_per_cycle_ir_first() {
    let (mut app, mut hw, mut sink) = make_app();
    for now in [2_100, 2_200, 2_300] {
        cycle_at(&mut app, &mut hw, &mut sink, now);
    }
    assert_eq!(hw.sonar_reads, 3);
    assert_eq!(hw.proximity_reads, 3);
    assert_eq!(hw.read_order[..2], ["ir", "sonar"]);
}

// ── Grab ──────────────────────────────────────────────────────

#[test]
fn end_to_end_grab_with_frozen_clock() {
    let (mut app, mut hw, mut sink) = make_app();
    object_ahead(&mut hw);

    let clock = cycle_at(&mut app, &mut hw, &mut sink, 2_500);

    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::Forward(100),
            ActuatorCall::Stop,
            ActuatorCall::Grab(200),
            ActuatorCall::Lift(45),
        ]
    );
    assert_eq!(clock.holds, vec![2_000, 800, 1_000]);

    let state = app.controller_state();
    assert!(state.grabbed);
    assert_eq!(state.ignore_ir_until_ms, 10_500);
    assert_eq!(app.state(), StateId::WallFollowing);
    assert_eq!(
        sink.transitions(),
        vec![
            (StateId::Startup, StateId::Grabbing),
            (StateId::Grabbing, StateId::WallFollowing),
        ]
    );
    assert_eq!(sink.grab_completions(), vec![10_500]);
}

#[test]
fn suppression_counts_from_the_end_of_the_sequence() {
    let (mut app, mut hw, mut sink) = make_app();
    object_ahead(&mut hw);

    let mut clock = MockClock::running(2_500);
    app.cycle(&mut hw, &mut clock, &mut sink);

    assert_eq!(clock.total_hold_ms(), 3_800);
    assert_eq!(clock.now, 6_300);
    assert_eq!(app.controller_state().ignore_ir_until_ms, 14_300);
}

#[test]
fn any_single_gate_failing_blocks_the_grab() {
    let variants: [(&str, fn(&mut MockHardware)); 4] = [
        ("right IR high", |hw| hw.set_ir(true, false)),
        ("left IR high", |hw| hw.set_ir(false, true)),
        ("front at trigger", |hw| hw.sonar.front = 15.0),
        ("front clear", |hw| hw.sonar.front = 400.0),
    ];

    for (name, flip) in variants {
        let (mut app, mut hw, mut sink) = make_app();
        object_ahead(&mut hw);
        flip(&mut hw);

        cycle_at(&mut app, &mut hw, &mut sink, 2_500);

        assert_eq!(app.state(), StateId::Seeking, "{name}");
        assert_eq!(hw.grab_count(), 0, "{name}");
        assert_eq!(hw.last_call(), Some(ActuatorCall::Forward(100)), "{name}");
        assert!(!app.controller_state().grabbed, "{name}");
    }
}

#[test]
fn grab_sequence_never_runs_twice() {
    let (mut app, mut hw, mut sink) = make_app();
    object_ahead(&mut hw);

    cycle_at(&mut app, &mut hw, &mut sink, 2_500);
    for now in (2_600..30_000).step_by(700) {
        cycle_at(&mut app, &mut hw, &mut sink, now);
        assert_eq!(app.state(), StateId::WallFollowing, "at {now} ms");
        assert!(app.controller_state().grabbed);
    }
    assert_eq!(hw.grab_count(), 1);
    assert_eq!(sink.grab_completions().len(), 1);
}

#[test]
fn suppression_window_runs_wall_following() {
    let (mut app, mut hw, mut sink) = make_app();
    object_ahead(&mut hw);
    cycle_at(&mut app, &mut hw, &mut sink, 2_500);
    hw.clear_calls();

    // Still inside the window (deadline inclusive), triggers all present.
    cycle_at(&mut app, &mut hw, &mut sink, 10_500);

    assert_eq!(app.state(), StateId::WallFollowing);
    assert_eq!(hw.grab_count(), 0);
    assert_eq!(app.branch(), "centered: forward");
}

#[test]
fn failed_servo_does_not_abort_the_sequence() {
    let (mut app, mut hw, mut sink) = make_app();
    object_ahead(&mut hw);
    hw.fail_servos = true;

    let clock = cycle_at(&mut app, &mut hw, &mut sink, 2_500);

    assert_eq!(clock.holds, vec![2_000, 800, 1_000]);
    assert_eq!(hw.calls.len(), 4);
    assert!(app.controller_state().grabbed);
}

// ── Wall following ────────────────────────────────────────────

fn grabbed_app() -> (ControlLoop, MockHardware, LogSink) {
    let (mut app, mut hw, mut sink) = make_app();
    object_ahead(&mut hw);
    cycle_at(&mut app, &mut hw, &mut sink, 2_500);
    hw.set_ir(false, false);
    hw.clear_calls();
    sink.events.clear();
    (app, hw, sink)
}

#[test]
fn wall_ahead_turns_toward_open_side() {
    let (mut app, mut hw, mut sink) = grabbed_app();

    hw.set_sonar(5.0, 30.0, 20.0);
    let clock = cycle_at(&mut app, &mut hw, &mut sink, 11_000);
    assert_eq!(hw.calls, vec![ActuatorCall::TurnLeft(90), ActuatorCall::Stop]);
    assert_eq!(clock.holds, vec![300]);

    hw.clear_calls();
    hw.set_sonar(5.0, 20.0, 20.0);
    cycle_at(&mut app, &mut hw, &mut sink, 11_100);
    assert_eq!(hw.calls, vec![ActuatorCall::TurnRight(90), ActuatorCall::Stop]);

    assert_eq!(
        sink.branches(),
        vec!["wall ahead: turning left", "wall ahead: turning right"]
    );
}

#[test]
fn side_imbalance_is_corrected_with_short_turns() {
    let (mut app, mut hw, mut sink) = grabbed_app();

    hw.set_sonar(20.0, 25.0, 20.0);
    let clock = cycle_at(&mut app, &mut hw, &mut sink, 11_000);
    assert_eq!(hw.calls, vec![ActuatorCall::TurnRight(90), ActuatorCall::Stop]);
    assert_eq!(clock.holds, vec![150]);

    hw.clear_calls();
    hw.set_sonar(20.0, 20.0, 25.0);
    cycle_at(&mut app, &mut hw, &mut sink, 11_100);
    assert_eq!(hw.calls, vec![ActuatorCall::TurnLeft(90), ActuatorCall::Stop]);
}

#[test]
fn balanced_or_dead_band_drives_forward() {
    let (mut app, mut hw, mut sink) = grabbed_app();

    hw.set_sonar(20.0, 20.5, 20.0);
    let clock = cycle_at(&mut app, &mut hw, &mut sink, 11_000);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward(100)]);
    assert!(clock.holds.is_empty());

    hw.clear_calls();
    hw.set_sonar(20.0, 21.8, 20.0);
    cycle_at(&mut app, &mut hw, &mut sink, 11_100);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward(100)]);

    assert_eq!(sink.branches(), vec!["centered: forward", "default: forward"]);
}

#[test]
fn wall_following_decides_on_a_second_sonar_frame() {
    let (mut app, mut hw, mut sink) = grabbed_app();
    let reads_before = hw.sonar_reads;

    // First frame shows a wall ahead; the one taken right after is clear.
    hw.script_sonar(5.0, 30.0, 20.0);
    hw.script_sonar(20.0, 20.0, 20.0);
    hw.read_order.clear();
    cycle_at(&mut app, &mut hw, &mut sink, 11_000);

    assert_eq!(hw.sonar_reads - reads_before, 2);
    assert_eq!(hw.read_order, ["ir", "sonar", "sonar"]);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward(100)]);
    assert_eq!(app.sensors().sonar.front, 20.0);
    assert_eq!(sink.branches(), vec!["centered: forward"]);
}

#[test]
fn lost_echoes_read_as_open_space() {
    let (mut app, mut hw, mut sink) = grabbed_app();
    hw.set_sonar(400.0, 400.0, 400.0);
    cycle_at(&mut app, &mut hw, &mut sink, 11_000);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward(100)]);
}

// ── Diagnostics ───────────────────────────────────────────────

#[test]
fn every_cycle_emits_a_report() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_sonar(42.0, 12.0, 13.0);
    cycle_at(&mut app, &mut hw, &mut sink, 100);
    cycle_at(&mut app, &mut hw, &mut sink, 2_100);

    let reports: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Cycle(r) => Some(r.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].state, StateId::Startup);
    assert_eq!(reports[0].branch, "startup: forward");
    assert_eq!(reports[1].cycle, 2);
    assert_eq!(reports[1].state, StateId::Seeking);
    assert_eq!(reports[1].sonar.front, 42.0);
    assert_eq!(app.cycle_count(), 2);
}
