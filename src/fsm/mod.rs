//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │  StateTable                                       │
//! │  ┌─────────┬───────────┬───────────────────────┐  │
//! │  │ StateId │ on_enter  │ on_update             │  │
//! │  ├─────────┼───────────┼───────────────────────┤  │
//! │  │ Down    │ fn(ctx)   │ fn(ctx, motion)->Opt  │  │
//! │  │ Up      │ fn(ctx)   │ fn(ctx, motion)->Opt  │  │
//! │  └─────────┴───────────┴───────────────────────┘  │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! Each tick (one per second) the engine calls `on_update` for the
//! **current** state with the blackboard and the [`Motion`] seam. If it
//! returns `Some(next_id)`, the engine moves the current pointer and runs
//! `on_enter` for the next state.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

use crate::actuator::Motion;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Awning position.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Down = 0,
    Up = 1,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `StateId`.  Out-of-range indices map to
    /// `Down`, the position the controller assumes at power-up.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => Self::Up,
            0 => Self::Down,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Down
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-second update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext, &mut dyn Motion) -> Option<StateId>;

/// Static descriptor for a single FSM state. The table position is the
/// state's [`StateId`].
pub struct StateDescriptor {
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
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

    /// Advance the FSM by one second.
    pub fn tick(&mut self, ctx: &mut FsmContext, motion: &mut dyn Motion) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx, motion);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (manual override). No-op if already
    /// in `next`.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
