//! Mock hardware adapter for integration tests.
//!
//! Simulates the 40 Hz time base: every `seconds()` poll and every
//! `idle()` advances one 25 ms tick. The real [`SoftWatchdog`] is serviced
//! on each tick so a loop that stops refreshing shows up as starvation.
//! Relay writes are recorded with their tick for sequencing assertions.

use std::ops::Range;

use awning::acquisition::Channel;
use awning::app::events::AppEvent;
use awning::app::ports::{
    ButtonPort, ClockPort, EventSink, RelayPort, SensorPort, StatusPort, WatchdogPort,
};
use awning::config::{SOFT_WD_BOOT_COUNTS, SOFT_WD_COUNTS, TIME_BASE_HZ};
use awning::drivers::led_patterns::StatusView;
use awning::drivers::watchdog::SoftWatchdog;
use awning::timebase::TimeSnapshot;

// ── Relay call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCall {
    Auto(bool),
    Down(bool),
    Power(bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub ticks: u32,
    /// Filtered channel values, indexed by [`Channel::index`].
    pub channels: [u16; Channel::COUNT],
    /// Anemometer pulses per second.
    pub wind_rate: u16,
    /// Ticks during which the down button is held.
    pub press: Option<Range<u32>>,
    pub relays: Vec<(u32, RelayCall)>,
    pub auto_on: bool,
    pub direction_down: bool,
    pub power_on: bool,
    pub warning_led: bool,
    pub status: Option<StatusView>,
    pub starved: bool,
    pulses_at_second: u16,
    watchdog: SoftWatchdog,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            channels: [0; Channel::COUNT],
            wind_rate: 0,
            press: None,
            relays: Vec::new(),
            auto_on: false,
            direction_down: false,
            power_on: false,
            warning_led: false,
            status: None,
            starved: false,
            pulses_at_second: 0,
            watchdog: SoftWatchdog::new(SOFT_WD_BOOT_COUNTS, SOFT_WD_COUNTS),
        }
    }

    pub fn set(&mut self, channel: Channel, value: u16) {
        self.channels[channel.index()] = value;
    }

    /// Reference and measuring swings giving roughly `ratio`.
    pub fn set_water_ratio(&mut self, ratio: u32) {
        self.set(Channel::WaterRef, 32_768);
        self.set(Channel::WaterMeasure, (ratio / 2) as u16);
    }

    pub fn secs(&self) -> u32 {
        self.ticks / u32::from(TIME_BASE_HZ)
    }

    pub fn motor_moved(&self) -> bool {
        self.relays.iter().any(|(_, c)| *c == RelayCall::Power(true))
    }

    /// Tick of the first occurrence of `call`, or `u32::MAX`.
    pub fn tick_of(&self, call: RelayCall) -> u32 {
        self.relays
            .iter()
            .find(|(_, c)| *c == call)
            .map_or(u32::MAX, |(t, _)| *t)
    }

    /// Power-on writes with the direction relay state at that moment.
    pub fn motions(&self) -> Vec<bool> {
        let mut down = false;
        let mut out = Vec::new();
        for (_, call) in &self.relays {
            match call {
                RelayCall::Down(d) => down = *d,
                RelayCall::Power(true) => out.push(down),
                _ => {}
            }
        }
        out
    }

    fn advance(&mut self) {
        self.ticks += 1;
        if !self.watchdog.service() {
            self.starved = true;
        }
        if self.ticks % u32::from(TIME_BASE_HZ) == 0 {
            self.pulses_at_second = self.pulses_at_second.wrapping_add(self.wind_rate);
        }
    }

    fn record(&mut self, call: RelayCall) {
        self.relays.push((self.ticks, call));
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_filtered(&self, channel: Channel) -> u16 {
        self.channels[channel.index()]
    }

    fn time_snapshot(&self) -> TimeSnapshot {
        TimeSnapshot {
            seconds: self.secs() as u8,
            pulses: self.pulses_at_second,
        }
    }
}

impl RelayPort for MockHardware {
    fn set_auto_select(&mut self, on: bool) {
        self.auto_on = on;
        self.record(RelayCall::Auto(on));
    }

    fn set_direction_down(&mut self, down: bool) {
        self.direction_down = down;
        self.record(RelayCall::Down(down));
    }

    fn set_power_drive(&mut self, on: bool) {
        self.power_on = on;
        self.record(RelayCall::Power(on));
    }
}

impl ButtonPort for MockHardware {
    fn down_button_pressed(&mut self) -> bool {
        self.press.as_ref().is_some_and(|p| p.contains(&self.ticks))
    }
}

impl ClockPort for MockHardware {
    fn seconds(&mut self) -> u8 {
        self.advance();
        self.secs() as u8
    }

    fn idle(&mut self) {
        self.advance();
    }
}

impl WatchdogPort for MockHardware {
    fn refresh_watchdog(&mut self) {
        self.watchdog.refresh();
    }
}

impl StatusPort for MockHardware {
    fn set_warning_led(&mut self, on: bool) {
        self.warning_led = on;
    }

    fn publish_status(&mut self, status: StatusView) {
        self.status = Some(status);
    }
}

// ── Event capture ─────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
