//! Integration tests for the AppService → FSM → actuator pipeline.
//!
//! The full main loop runs against [`MockHardware`] with the bench
//! profile (two-minute auto-down delay, short travel times), so whole
//! rain and wind episodes play out in simulated time.

use crate::mock_hw::{LogSink, MockHardware, RelayCall};

use awning::acquisition::Channel;
use awning::actuator::{ActuationResult, Direction};
use awning::alarms::AlarmKind;
use awning::app::events::AppEvent;
use awning::app::service::AppService;
use awning::config::{AwningConfig, SiteProfile};
use awning::fsm::StateId;
use awning::fsm::context::Mode;

const DRY: u32 = 60_000;
const WET: u32 = 10_000;
/// Water pot position giving a setpoint of 30000.
const WATER_POT: u16 = ((30_000 - 8_192) * 2) as u16;

fn bench() -> AwningConfig {
    AwningConfig::for_site(SiteProfile::Bench)
}

fn make_app() -> (AppService, MockHardware, LogSink) {
    let mut app = AppService::new(bench());
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    hw.set(Channel::WaterThresholdPot, WATER_POT);
    hw.set(Channel::WindThresholdPot, 0);
    hw.set_water_ratio(DRY);
    app.start(&mut sink);
    (app, hw, sink)
}

/// Run the main loop until `done` holds or `max_secs` of simulated time
/// have passed. Returns whether `done` was reached.
fn run_until(
    app: &mut AppService,
    hw: &mut MockHardware,
    sink: &mut LogSink,
    max_secs: u32,
    done: impl Fn(&AppService, &MockHardware, &LogSink) -> bool,
) -> bool {
    let deadline = hw.secs() + max_secs;
    while hw.secs() < deadline {
        app.run_once(hw, sink);
        if done(app, hw, sink) {
            return true;
        }
    }
    false
}

fn run_for(app: &mut AppService, hw: &mut MockHardware, sink: &mut LogSink, secs: u32) {
    run_until(app, hw, sink, secs, |_, _, _| false);
}

/// Dry start, then rain until the awning is up.
fn raised_by_rain() -> (AppService, MockHardware, LogSink) {
    let (mut app, mut hw, mut sink) = make_app();
    run_for(&mut app, &mut hw, &mut sink, 3);
    hw.set_water_ratio(WET);
    assert!(run_until(&mut app, &mut hw, &mut sink, 30, |a, _, _| a.state() == StateId::Up));
    (app, hw, sink)
}

// ── Power-up ──────────────────────────────────────────────────

#[test]
fn starts_down_in_auto_mode() {
    let (mut app, mut hw, mut sink) = make_app();
    assert_eq!(app.state(), StateId::Down);
    assert_eq!(app.mode(), Mode::Auto);
    assert_eq!(sink.events.first(), Some(&AppEvent::Started(StateId::Down)));

    run_for(&mut app, &mut hw, &mut sink, 5);
    let status = hw.status.expect("status published every iteration");
    assert!(status.is_down && status.is_auto);
    assert!(hw.relays.is_empty(), "dry and calm: relays untouched");
    assert!(!hw.warning_led);
    assert!(!hw.starved);
}

// ── Rain ──────────────────────────────────────────────────────

#[test]
fn four_wet_seconds_raise_the_awning() {
    let (app, hw, sink) = raised_by_rain();

    assert_eq!(app.mode(), Mode::Auto);
    assert_eq!(app.auto_down_timer(), bench().auto_down_delay_secs);
    assert_eq!(hw.motions(), vec![false], "one raise, direction relay off");
    assert!(!hw.auto_on && !hw.power_on && !hw.direction_down, "relays released");
    assert_eq!(app.alarm_supervisor().water_count(), 0, "alarm memory cleared");
    assert!(hw.warning_led);
    assert!(!hw.starved);

    assert!(sink.count(|e| matches!(e, AppEvent::AlarmRaised(f) if f.contains(AlarmKind::Water))) >= 1);
    assert!(sink.events.contains(&AppEvent::MotionFinished {
        direction: Direction::Up,
        result: ActuationResult::Completed,
    }));
    assert!(sink.events.contains(&AppEvent::StateChanged { from: StateId::Down, to: StateId::Up }));
}

#[test]
fn three_wet_seconds_are_not_enough() {
    let (mut app, mut hw, mut sink) = make_app();
    run_for(&mut app, &mut hw, &mut sink, 3);
    for _ in 0..5 {
        hw.set_water_ratio(WET);
        run_for(&mut app, &mut hw, &mut sink, 3);
        hw.set_water_ratio(DRY);
        run_for(&mut app, &mut hw, &mut sink, 2);
    }
    assert_eq!(app.state(), StateId::Down);
    assert!(!hw.motor_moved());
}

#[test]
fn awning_comes_back_down_after_the_delay() {
    let (mut app, mut hw, mut sink) = raised_by_rain();
    hw.set_water_ratio(DRY);
    let up_at = hw.secs();

    let delay = u32::from(bench().auto_down_delay_secs);
    assert!(run_until(&mut app, &mut hw, &mut sink, delay + 30, |a, _, _| a.state() == StateId::Down));

    assert!(hw.secs() - up_at >= delay, "lowered after {}s", hw.secs() - up_at);
    assert_eq!(hw.motions(), vec![false, true]);
    assert_eq!(app.mode(), Mode::Auto);
    assert!(!hw.starved);
}

#[test]
fn rain_while_up_holds_the_timer() {
    let (mut app, mut hw, mut sink) = raised_by_rain();
    run_for(&mut app, &mut hw, &mut sink, 40);
    assert_eq!(app.state(), StateId::Up);
    assert!(
        app.auto_down_timer() > bench().auto_down_delay_secs - 10,
        "timer {} should keep reloading",
        app.auto_down_timer()
    );
}

// ── Wind ──────────────────────────────────────────────────────

#[test]
fn sustained_gusts_raise_the_awning() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.wind_rate = 50;

    assert!(run_until(&mut app, &mut hw, &mut sink, 20, |a, _, _| a.state() == StateId::Up));
    assert!(sink.count(|e| matches!(e, AppEvent::AlarmRaised(f) if f.contains(AlarmKind::Wind))) >= 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::AlarmRaised(f) if f.contains(AlarmKind::Water))),
        0
    );
}

#[test]
fn wind_below_the_threshold_is_ignored() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.wind_rate = 39;
    run_for(&mut app, &mut hw, &mut sink, 30);
    assert_eq!(app.state(), StateId::Down);
    assert!(!hw.warning_led);
}

// ── Manual override ───────────────────────────────────────────

#[test]
fn button_while_up_switches_to_manual_down_without_moving() {
    let (mut app, mut hw, mut sink) = raised_by_rain();
    hw.set_water_ratio(DRY);
    hw.press = Some(hw.ticks + 1..hw.ticks + 41);
    run_for(&mut app, &mut hw, &mut sink, 3);

    assert_eq!(app.state(), StateId::Down);
    assert_eq!(app.mode(), Mode::Manual);
    assert_eq!(hw.motions(), vec![false], "the user lowered it by hand");
    assert_eq!(sink.count(|e| *e == AppEvent::ManualOverride), 1);
    assert!(sink.events.contains(&AppEvent::StateChanged { from: StateId::Up, to: StateId::Down }));
}

#[test]
fn manual_mode_raises_on_rain_but_never_lowers() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.press = Some(0..40);
    run_for(&mut app, &mut hw, &mut sink, 3);
    assert_eq!(app.mode(), Mode::Manual);

    hw.set_water_ratio(WET);
    assert!(run_until(&mut app, &mut hw, &mut sink, 30, |a, _, _| a.state() == StateId::Up));
    assert_eq!(app.mode(), Mode::Manual);

    hw.set_water_ratio(DRY);
    run_for(&mut app, &mut hw, &mut sink, u32::from(bench().auto_down_delay_secs) + 20);
    assert_eq!(app.state(), StateId::Up);
    assert_eq!(hw.motions(), vec![false]);
}

#[test]
fn press_during_raise_interrupts_and_goes_manual() {
    let (mut app, mut hw, mut sink) = make_app();
    run_for(&mut app, &mut hw, &mut sink, 3);
    hw.set_water_ratio(WET);
    let t0 = hw.ticks;
    hw.press = Some(t0 + 320..t0 + 400);

    let interrupted = |_: &AppService, _: &MockHardware, s: &LogSink| {
        s.events.contains(&AppEvent::MotionFinished {
            direction: Direction::Up,
            result: ActuationResult::Interrupted,
        })
    };
    assert!(run_until(&mut app, &mut hw, &mut sink, 40, interrupted));

    assert_eq!(app.state(), StateId::Down);
    assert_eq!(app.mode(), Mode::Manual);
    let off = hw.tick_of(RelayCall::Power(false));
    assert!((t0 + 320..t0 + 323).contains(&off), "motor stopped at tick {off}");
    assert!(!hw.auto_on && !hw.power_on);
    assert!(!hw.starved);
}

#[test]
fn holding_the_button_after_an_interrupt_keeps_the_watchdog_fed() {
    let (mut app, mut hw, mut sink) = make_app();
    run_for(&mut app, &mut hw, &mut sink, 3);
    hw.set_water_ratio(WET);
    let t0 = hw.ticks;
    let released = t0 + 800;
    hw.press = Some(t0 + 320..released);

    let interrupted = |_: &AppService, _: &MockHardware, s: &LogSink| {
        s.events.contains(&AppEvent::MotionFinished {
            direction: Direction::Up,
            result: ActuationResult::Interrupted,
        })
    };
    assert!(run_until(&mut app, &mut hw, &mut sink, 40, interrupted));

    assert!(!hw.starved, "watchdog starved while the button was held");
    let auto_off = hw
        .relays
        .iter()
        .rev()
        .find(|(_, c)| *c == RelayCall::Auto(false))
        .map(|(t, _)| *t)
        .expect("auto relay released");
    assert!(auto_off >= released, "relays released at tick {auto_off} while still held");
    assert!(!hw.auto_on && !hw.power_on);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_is_reported_every_interval() {
    let (mut app, mut hw, mut sink) = make_app();
    let interval = u32::from(bench().telemetry_interval_secs);
    run_for(&mut app, &mut hw, &mut sink, 2 * interval + 1);

    let reports: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].state, StateId::Down);
    assert_eq!(reports[0].water_setpoint, 30_000);
    assert_eq!(reports[0].wind_threshold, 39);
}
