//! Fuzz target: `AppService::run_once`
//!
//! Each input byte scripts one simulated second: bit 0 holds the down
//! button, bit 1 wets the rain detector, bits 2-7 set the anemometer rate.
//! The loop runs against a small simulated board and asserts the relay
//! safety rules: the direction relay never switches with the motor
//! powered, and no motion leaves the motor powered when the loop regains
//! control.
//!
//! cargo fuzz run fuzz_control_loop

#![no_main]

use awning::acquisition::Channel;
use awning::app::events::AppEvent;
use awning::app::ports::{
    ButtonPort, ClockPort, EventSink, RelayPort, SensorPort, StatusPort, WatchdogPort,
};
use awning::app::service::AppService;
use awning::config::{AwningConfig, SiteProfile, TIME_BASE_HZ};
use awning::drivers::led_patterns::StatusView;
use awning::timebase::TimeSnapshot;
use libfuzzer_sys::fuzz_target;

struct Board<'a> {
    script: &'a [u8],
    ticks: u32,
    pulses: u16,
    power: bool,
}

impl Board<'_> {
    fn byte(&self) -> u8 {
        let second = (self.ticks / u32::from(TIME_BASE_HZ)) as usize;
        self.script.get(second).copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        self.ticks += 1;
        if self.ticks % u32::from(TIME_BASE_HZ) == 0 {
            self.pulses = self.pulses.wrapping_add(u16::from(self.byte() >> 2));
        }
    }
}

impl SensorPort for Board<'_> {
    fn read_filtered(&self, channel: Channel) -> u16 {
        match channel {
            Channel::WaterRef => 32_768,
            Channel::WaterMeasure if self.byte() & 2 != 0 => 3_000,
            Channel::WaterMeasure => 30_000,
            Channel::WindThresholdPot => 0,
            Channel::WaterThresholdPot => 43_616,
        }
    }

    fn time_snapshot(&self) -> TimeSnapshot {
        TimeSnapshot {
            seconds: (self.ticks / u32::from(TIME_BASE_HZ)) as u8,
            pulses: self.pulses,
        }
    }
}

impl RelayPort for Board<'_> {
    fn set_auto_select(&mut self, _on: bool) {}

    fn set_direction_down(&mut self, _down: bool) {
        assert!(!self.power, "direction relay switched under load");
    }

    fn set_power_drive(&mut self, on: bool) {
        self.power = on;
    }
}

impl ButtonPort for Board<'_> {
    fn down_button_pressed(&mut self) -> bool {
        self.byte() & 1 != 0
    }
}

impl ClockPort for Board<'_> {
    fn seconds(&mut self) -> u8 {
        self.advance();
        (self.ticks / u32::from(TIME_BASE_HZ)) as u8
    }

    fn idle(&mut self) {
        self.advance();
    }
}

impl WatchdogPort for Board<'_> {
    fn refresh_watchdog(&mut self) {}
}

impl StatusPort for Board<'_> {
    fn set_warning_led(&mut self, _on: bool) {}
    fn publish_status(&mut self, _status: StatusView) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let script = &data[..data.len().min(600)];
    let mut board = Board { script, ticks: 0, pulses: 0, power: false };
    let mut app = AppService::new(AwningConfig::for_site(SiteProfile::Bench));
    app.start(&mut Discard);

    let end = (script.len() as u32 + 1) * u32::from(TIME_BASE_HZ);
    while board.ticks < end {
        app.run_once(&mut board, &mut Discard);
        assert!(!board.power, "motor left powered");
        assert!(app.auto_down_timer() <= 120);
    }
});
