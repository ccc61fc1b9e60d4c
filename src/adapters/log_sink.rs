//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::actuator::ActuationResult;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} mode={:?} auto_down={}s | wind={}/{} gusts={} | \
                     water ratio={} thr={} set={} count={} | alarms={}",
                    t.state,
                    t.mode,
                    t.auto_down_timer,
                    t.wind_pulses,
                    t.wind_threshold,
                    t.active_gusts,
                    t.water_ratio,
                    t.water_threshold,
                    t.water_setpoint,
                    t.water_count,
                    t.alarms,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::AlarmRaised(flags) => {
                warn!("ALARM | {}", flags);
            }
            AppEvent::ManualOverride => {
                info!("MODE  | manual (down button)");
            }
            AppEvent::MotionStarted(direction) => {
                info!("MOTOR | moving {:?}", direction);
            }
            AppEvent::MotionFinished { direction, result } => match result {
                ActuationResult::Completed => info!("MOTOR | {:?} complete", direction),
                ActuationResult::Interrupted => warn!("MOTOR | {:?} interrupted by button", direction),
            },
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
