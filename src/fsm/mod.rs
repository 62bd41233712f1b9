//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                            │
//! │  ┌───────────────┬──────────┬─────────┬───────────────┬─────────────┐  │
//! │  │ StateId       │ on_enter │ on_exit │ on_update     │ on_done     │  │
//! │  ├───────────────┼──────────┼─────────┼───────────────┼─────────────┤  │
//! │  │ Startup       │ fn(ctx)  │   -     │ fn(ctx)->Opt  │     -       │  │
//! │  │ Seeking       │ fn(ctx)  │   -     │ fn(ctx)->Opt  │     -       │  │
//! │  │ Grabbing      │ fn(ctx)  │ fn(ctx) │ fn(ctx)->Opt  │ fn(ctx)->Opt│  │
//! │  │ WallFollowing │ fn(ctx)  │   -     │ fn(ctx)->Opt  │     -       │  │
//! │  └───────────────┴──────────┴─────────┴───────────────┴─────────────┘  │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.  If it
//! returns `Some(next_id)`, the engine runs `on_exit` for the current state,
//! then `on_enter` for the next, and updates the current pointer.  The newly
//! entered state is then updated in the same tick, so a cycle always ends on
//! a settled decision (at most [`StateId::COUNT`] transitions per tick).
//!
//! Handlers never touch hardware.  They write a [`context::Maneuver`] into
//! the context; the control loop executes it and then reports completion
//! through [`Fsm::maneuver_complete`], which runs the state's `on_done`.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all navigation modes.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Startup = 0,
    Seeking = 1,
    Grabbing = 2,
    WallFollowing = 3,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `StateId`.  Asserts in debug builds;
    /// falls back to `Seeking` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Startup,
            1 => Self::Seeking,
            2 => Self::Grabbing,
            3 => Self::WallFollowing,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Seeking
            }
        }
    }

    /// Upper-case tag used on the diagnostic line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Startup => "STARTUP",
            Self::Seeking => "SEEKING",
            Self::Grabbing => "GRABBING",
            Self::WallFollowing => "WALL_FOLLOWING",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler and the maneuver-done hook.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
    /// Runs after the control loop finished this state's maneuver.
    pub on_done: Option<StateUpdateFn>,
    /// Take a second sonar frame right before this state's update.
    pub resample_sonar: bool,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and works on a
/// mutable [`FsmContext`] threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id as usize == i),
            "state table rows must be ordered by StateId"
        );
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition and update the
    ///    new state as well, until a state stays put.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        for _ in 0..StateId::COUNT {
            match (self.table[self.current].on_update)(ctx) {
                Some(next_id) if next_id as usize != self.current => {
                    self.transition(next_id, ctx);
                }
                _ => return,
            }
        }
        log::warn!(
            "FSM did not settle within one tick, holding {}",
            self.table[self.current].name
        );
    }

    /// Report that the maneuver planned by the current state has been
    /// executed in full.
    pub fn maneuver_complete(&mut self, ctx: &mut FsmContext) {
        if let Some(done) = self.table[self.current].on_done {
            if let Some(next_id) = done(ctx) {
                self.force_transition(next_id, ctx);
            }
        }
    }

    /// Force an immediate transition, bypassing `on_update`.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Whether the current state decides on a second sonar frame.
    pub fn resamples_sonar(&self) -> bool {
        self.table[self.current].resample_sonar
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
