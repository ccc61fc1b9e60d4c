//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard the state handlers read from and write
//! to: the operating mode, the auto-down timer, this second's alarm flags
//! and the requests the handlers leave for the service.

use crate::alarms::AlarmFlags;
use crate::config::AwningConfig;

/// Who is in charge of the awning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The controller raises on alarms and lowers again after the delay.
    Auto,
    /// The user took over; only alarms move the awning.
    Manual,
}

/// The blackboard.
#[derive(Debug, Clone)]
pub struct FsmContext {
    pub mode: Mode,
    /// Seconds left before an automatic descent (counts down while up).
    pub auto_down_timer: u16,
    /// Value the timer is loaded with.
    pub auto_down_delay: u16,
    /// Alarm flags of the current second.
    pub alarms: AlarmFlags,
    /// Set by a handler after every motion attempt: the alarm memory must
    /// be cleared by the supervisor.
    pub clear_alarm_memory: bool,
}

impl FsmContext {
    pub fn new(config: &AwningConfig) -> Self {
        Self {
            mode: Mode::Auto,
            auto_down_timer: 0,
            auto_down_delay: config.auto_down_delay_secs,
            alarms: AlarmFlags::NONE,
            clear_alarm_memory: false,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.mode == Mode::Auto
    }

    /// Take the pending alarm-memory clear request.
    pub fn take_clear_request(&mut self) -> bool {
        core::mem::take(&mut self.clear_alarm_memory)
    }
}
