//! Concrete state handler functions and table builder.
//!
//! ```text
//!            [alarm, raise completed]
//!   DOWN ───────────────────────────────▶ UP
//!     ▲                                    │
//!     └──[auto, timer expired, lowered]────┘
//!
//!   DOWN ──[alarm, raise interrupted]──▶ DOWN (manual)
//!   UP   ──[lower interrupted]──────────▶ DOWN (manual)
//!   any  ──[down button]────────────────▶ DOWN (manual)
//! ```
//!
//! Handlers run once per second. Motions block inside the handler.

use super::context::{FsmContext, Mode};
use super::{StateDescriptor, StateId};
use crate::actuator::{ActuationResult, Direction, Motion};
use log::{info, warn};

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Down
        StateDescriptor {
            name: "Down",
            on_enter: Some(down_enter),
            on_update: down_update,
        },
        // Index 1: Up
        StateDescriptor {
            name: "Up",
            on_enter: Some(up_enter),
            on_update: up_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  DOWN state: awning extended
// ═══════════════════════════════════════════════════════════════════════════

fn down_enter(ctx: &mut FsmContext) {
    info!("DOWN: awning extended ({:?})", ctx.mode);
}

fn down_update(ctx: &mut FsmContext, motion: &mut dyn Motion) -> Option<StateId> {
    if !ctx.alarms.alarm() {
        return None;
    }

    info!("DOWN: {} -> raising", ctx.alarms);
    let result = motion.move_awning(Direction::Up);
    ctx.clear_alarm_memory = true;
    match result {
        ActuationResult::Completed => Some(StateId::Up),
        ActuationResult::Interrupted => {
            warn!("DOWN: raise interrupted, switching to manual");
            ctx.mode = Mode::Manual;
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  UP state: awning retracted
// ═══════════════════════════════════════════════════════════════════════════

fn up_enter(ctx: &mut FsmContext) {
    ctx.auto_down_timer = ctx.auto_down_delay;
    info!(
        "UP: awning retracted ({:?}, auto-down in {} s)",
        ctx.mode, ctx.auto_down_timer
    );
}

fn up_update(ctx: &mut FsmContext, motion: &mut dyn Motion) -> Option<StateId> {
    if ctx.alarms.alarm() {
        // Keep the awning up for the full delay after the last alarm.
        ctx.auto_down_timer = ctx.auto_down_delay;
        return None;
    }
    if ctx.mode != Mode::Auto {
        return None;
    }
    if ctx.auto_down_timer > 0 {
        ctx.auto_down_timer -= 1;
        return None;
    }

    info!("UP: auto-down delay elapsed -> lowering");
    let result = motion.move_awning(Direction::Down);
    ctx.clear_alarm_memory = true;
    if result == ActuationResult::Interrupted {
        warn!("UP: lowering interrupted, switching to manual");
        ctx.mode = Mode::Manual;
    }
    Some(StateId::Down)
}
