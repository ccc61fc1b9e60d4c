//! Hardware adapter: bridges the board to the domain port traits.
//!
//! Owns the relay outputs, the down button, the warning LED and a delay
//! source, all as `embedded-hal` 1.0 pins, and reads the interrupt-side
//! state (filtered channels, time base, soft watchdog) through the shared
//! cells. This is the only module the control loop goes through to touch
//! hardware. On the board the pins are `esp_idf_hal` `PinDriver`s; tests
//! plug in fakes.
//!
//! Electrical polarity lives here and nowhere else: the TRIAC gate, the
//! red LED and the button are active-low.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::error;

use crate::acquisition::{Channel, SharedAcquisition};
use crate::app::ports::{
    ButtonPort, ClockPort, RelayPort, SensorPort, StatusPort, WatchdogPort,
};
use crate::drivers::led_patterns::StatusView;
use crate::drivers::watchdog::SoftWatchdog;
use crate::timebase::{SharedTimeBase, TimeSnapshot};

/// Length of one idle slice. Shorter than a time-base tick so the loop
/// never misses a second by more than one slice.
pub const IDLE_SLICE_MS: u32 = 5;

/// The motor outputs as typed pins.
pub struct RelayPins<Auto, Dir, Pwr> {
    pub auto_select: Auto,
    pub direction_down: Dir,
    pub triac_off: Pwr,
}

/// Concrete adapter that combines all board I/O behind port traits.
pub struct HardwareAdapter<'a, Btn, Auto, Dir, Pwr, Warn, D> {
    button: Btn,
    relays: RelayPins<Auto, Dir, Pwr>,
    warning_led: Warn,
    delay: D,
    acquisition: &'a SharedAcquisition,
    time_base: &'a SharedTimeBase,
    watchdog: &'a SoftWatchdog,
}

impl<'a, Btn, Auto, Dir, Pwr, Warn, D> HardwareAdapter<'a, Btn, Auto, Dir, Pwr, Warn, D>
where
    Btn: InputPin,
    Auto: OutputPin,
    Dir: OutputPin,
    Pwr: OutputPin,
    Warn: OutputPin,
    D: DelayNs,
{
    /// Build the adapter and drive every output to its safe state: motor
    /// unpowered, relays released, warning LED off.
    pub fn new(
        button: Btn,
        relays: RelayPins<Auto, Dir, Pwr>,
        warning_led: Warn,
        delay: D,
        acquisition: &'a SharedAcquisition,
        time_base: &'a SharedTimeBase,
        watchdog: &'a SoftWatchdog,
    ) -> Self {
        let mut adapter = Self {
            button,
            relays,
            warning_led,
            delay,
            acquisition,
            time_base,
            watchdog,
        };
        adapter.set_power_drive(false);
        adapter.set_direction_down(false);
        adapter.set_auto_select(false);
        adapter.set_warning_led(false);
        adapter
    }

    /// Tear down the adapter, returning the owned pins.
    pub fn release(self) -> (Btn, RelayPins<Auto, Dir, Pwr>, Warn, D) {
        (self.button, self.relays, self.warning_led, self.delay)
    }
}

fn drive<P: OutputPin>(pin: &mut P, state: PinState, what: &str) {
    if let Err(e) = pin.set_state(state) {
        error!("{what}: pin write failed: {e:?}");
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<Btn, Auto, Dir, Pwr, Warn, D> SensorPort for HardwareAdapter<'_, Btn, Auto, Dir, Pwr, Warn, D> {
    fn read_filtered(&self, channel: Channel) -> u16 {
        self.acquisition.read_filtered(channel)
    }

    fn time_snapshot(&self) -> TimeSnapshot {
        self.time_base.snapshot()
    }
}

// ── Motion ports ──────────────────────────────────────────────

impl<Btn, Auto, Dir, Pwr, Warn, D> RelayPort for HardwareAdapter<'_, Btn, Auto, Dir, Pwr, Warn, D>
where
    Auto: OutputPin,
    Dir: OutputPin,
    Pwr: OutputPin,
{
    fn set_auto_select(&mut self, on: bool) {
        drive(&mut self.relays.auto_select, PinState::from(on), "auto relay");
    }

    fn set_direction_down(&mut self, down: bool) {
        drive(&mut self.relays.direction_down, PinState::from(down), "direction relay");
    }

    fn set_power_drive(&mut self, on: bool) {
        drive(&mut self.relays.triac_off, PinState::from(!on), "triac");
    }
}

impl<Btn, Auto, Dir, Pwr, Warn, D> ButtonPort for HardwareAdapter<'_, Btn, Auto, Dir, Pwr, Warn, D>
where
    Btn: InputPin,
{
    fn down_button_pressed(&mut self) -> bool {
        match self.button.is_low() {
            Ok(pressed) => pressed,
            Err(e) => {
                error!("down button: pin read failed: {e:?}");
                false
            }
        }
    }
}

impl<Btn, Auto, Dir, Pwr, Warn, D> ClockPort for HardwareAdapter<'_, Btn, Auto, Dir, Pwr, Warn, D>
where
    D: DelayNs,
{
    fn seconds(&mut self) -> u8 {
        self.time_base.seconds()
    }

    fn idle(&mut self) {
        self.delay.delay_ms(IDLE_SLICE_MS);
    }
}

impl<Btn, Auto, Dir, Pwr, Warn, D> WatchdogPort for HardwareAdapter<'_, Btn, Auto, Dir, Pwr, Warn, D> {
    fn refresh_watchdog(&mut self) {
        self.watchdog.refresh();
    }
}

// ── StatusPort implementation ─────────────────────────────────

impl<Btn, Auto, Dir, Pwr, Warn, D> StatusPort for HardwareAdapter<'_, Btn, Auto, Dir, Pwr, Warn, D>
where
    Warn: OutputPin,
{
    fn set_warning_led(&mut self, on: bool) {
        drive(&mut self.warning_led, PinState::from(!on), "warning LED");
    }

    fn publish_status(&mut self, status: StatusView) {
        self.time_base.publish_status(status);
    }
}
