//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::actuator::{ActuationResult, Direction};
use crate::alarms::AlarmFlags;
use crate::fsm::StateId;
use crate::fsm::context::Mode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The down button took over: manual mode, awning down.
    ManualOverride,

    /// A wind or water alarm is active this second.
    AlarmRaised(AlarmFlags),

    /// A motion sequence is about to run.
    MotionStarted(Direction),

    /// A motion sequence ended.
    MotionFinished {
        direction: Direction,
        result: ActuationResult,
    },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryData {
    pub state: StateId,
    pub mode: Mode,
    pub auto_down_timer: u16,
    pub wind_pulses: u8,
    pub wind_threshold: u8,
    pub water_ratio: u32,
    pub water_threshold: u32,
    pub water_setpoint: u32,
    pub water_count: u8,
    pub active_gusts: u8,
    pub alarms: AlarmFlags,
}
