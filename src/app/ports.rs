//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (board I/O, clock, event sinks) implement these traits.
//! The [`AppService`](super::service::AppService) and the
//! [`Actuator`](crate::actuator::Actuator) consume them via generics, so the
//! domain core never touches hardware directly. All ports are infallible:
//! an adapter that hits a pin error logs it and carries on with the outputs
//! in their safe state.

use crate::acquisition::Channel;
use crate::drivers::led_patterns::StatusView;
use crate::timebase::TimeSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: filtered analog values and the time-base snapshot.
pub trait SensorPort {
    /// Latest filtered value of `channel`.
    fn read_filtered(&self, channel: Channel) -> u16;

    /// Seconds counter and anemometer pulses, read together.
    fn time_snapshot(&self) -> TimeSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Motion ports (driven adapters: domain ↔ relays, button, clock)
// ───────────────────────────────────────────────────────────────

/// The three motor outputs.
pub trait RelayPort {
    /// Auto-select relay: hands the motor over to the controller.
    fn set_auto_select(&mut self, on: bool);

    /// Direction relay: `true` lowers the awning.
    fn set_direction_down(&mut self, down: bool);

    /// Motor power switch (TRIAC).
    fn set_power_drive(&mut self, on: bool);
}

/// The manual "down" push button.
pub trait ButtonPort {
    fn down_button_pressed(&mut self) -> bool;
}

/// Whole-second clock plus the low-power idle primitive.
pub trait ClockPort {
    /// Wrapping seconds counter maintained by the time base.
    fn seconds(&mut self) -> u8;

    /// Sleep until the next interrupt.
    fn idle(&mut self);
}

/// Liveness proof towards the time base.
pub trait WatchdogPort {
    fn refresh_watchdog(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Status port (driven adapter: domain → indicators)
// ───────────────────────────────────────────────────────────────

pub trait StatusPort {
    /// Red warning LED, lit while a pre-alarm is active.
    fn set_warning_led(&mut self, on: bool);

    /// Publish the awning status to the blinking status LED.
    fn publish_status(&mut self, status: StatusView);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Composite ports
// ───────────────────────────────────────────────────────────────

/// Everything a motion sequence needs.
pub trait MotionHardware: RelayPort + ButtonPort + ClockPort + WatchdogPort {}

impl<T: RelayPort + ButtonPort + ClockPort + WatchdogPort + ?Sized> MotionHardware for T {}

/// Everything the control loop needs.
pub trait AwningHardware: MotionHardware + SensorPort + StatusPort {}

impl<T: MotionHardware + SensorPort + StatusPort + ?Sized> AwningHardware for T {}
