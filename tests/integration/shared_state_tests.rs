//! Interrupt-side state driven the way the board timers drive it.
//!
//! The sampling and time-base callbacks are plain functions over the
//! shared cells, so the host can replay them with synthetic ADC streams
//! and pulse counts.

use awning::acquisition::schedule::SCHEDULE_LEN;
use awning::acquisition::{Channel, SharedAcquisition};
use awning::alarms::water::water_ratio;
use awning::alarms::wind::WindMeter;
use awning::config::{SAMPLE_RATE_HZ, SOFT_WD_BOOT_COUNTS, SOFT_WD_COUNTS, TIME_BASE_HZ};
use awning::drivers::led_patterns::StatusView;
use awning::drivers::watchdog::SoftWatchdog;
use awning::timebase::SharedTimeBase;

/// ADC reading for `channel` while `excitation` is applied: each electrode
/// pair passes a fraction of the excitation, the pots read a fixed level.
fn detector(channel: Channel, excitation: u8, measure_gain: f32) -> u16 {
    let full = f32::from(excitation) * 256.0;
    match channel {
        Channel::WaterRef => full as u16,
        Channel::WaterMeasure => (full * measure_gain) as u16,
        Channel::WindThresholdPot => 20_000,
        Channel::WaterThresholdPot => 40_000,
    }
}

/// Replay the sampling callback for `secs` seconds.
fn sample(acq: &SharedAcquisition, secs: u32, measure_gain: f32) {
    for _ in 0..secs * u32::from(SAMPLE_RATE_HZ) {
        let step = acq.current_step();
        acq.on_conversion_complete(detector(step.channel, step.excitation, measure_gain));
    }
}

#[test]
fn one_period_converts_every_channel() {
    let acq = SharedAcquisition::new();
    for _ in 0..SCHEDULE_LEN {
        let step = acq.current_step();
        acq.on_conversion_complete(detector(step.channel, step.excitation, 1.0));
    }
    assert!(acq.snapshot().iter().all(|&v| v > 0), "{:?}", acq.snapshot());
}

#[test]
fn filtered_swings_give_the_electrode_ratio() {
    let acq = SharedAcquisition::new();
    sample(&acq, 30, 0.5);

    let [reference, measure, wind_pot, water_pot] = acq.snapshot();
    let ratio = water_ratio(reference, measure);
    assert!(ratio.abs_diff(32_768) < 400, "ratio {ratio}");
    assert!(wind_pot.abs_diff(20_000) < 50, "wind pot {wind_pot}");
    assert!(water_pot.abs_diff(40_000) < 50, "water pot {water_pot}");
}

#[test]
fn wetting_the_detector_lowers_the_ratio_gradually() {
    let acq = SharedAcquisition::new();
    sample(&acq, 30, 0.9);
    let dry = water_ratio(acq.read_filtered(Channel::WaterRef), acq.read_filtered(Channel::WaterMeasure));

    sample(&acq, 1, 0.1);
    let after_one = water_ratio(acq.read_filtered(Channel::WaterRef), acq.read_filtered(Channel::WaterMeasure));
    sample(&acq, 20, 0.1);
    let wet = water_ratio(acq.read_filtered(Channel::WaterRef), acq.read_filtered(Channel::WaterMeasure));

    assert!(dry > after_one && after_one > wet, "{dry} {after_one} {wet}");
    assert!(wet.abs_diff(6_554) < 400, "wet ratio {wet}");
}

#[test]
fn time_base_counts_seconds_and_snapshots_pulses() {
    let tb = SharedTimeBase::new(120);
    let wd = SoftWatchdog::new(SOFT_WD_BOOT_COUNTS, SOFT_WD_COUNTS);
    let mut meter = WindMeter::new();
    let mut pulses: u16 = 0;
    let mut samples = Vec::new();

    for _ in 0..5 * u32::from(TIME_BASE_HZ) {
        pulses = pulses.wrapping_add(2);
        let out = tb.on_tick(pulses, &wd);
        assert!(out.feed_watchdog);
        wd.refresh();

        let snap = tb.snapshot();
        if meter.is_new_second(snap) {
            samples.push(meter.sample(snap, 0));
        }
    }

    assert_eq!(tb.seconds(), 5);
    assert_eq!(samples.len(), 6, "seconds 0 to 5");
    assert!(samples[2..].iter().all(|s| s.pulses == 80 && s.pre_alarm), "{samples:?}");
}

#[test]
fn a_stuck_loop_stops_feeding_the_hardware_watchdog() {
    let tb = SharedTimeBase::new(120);
    let wd = SoftWatchdog::new(SOFT_WD_BOOT_COUNTS, SOFT_WD_COUNTS);

    let fed = (0..40).filter(|_| tb.on_tick(0, &wd).feed_watchdog).count();
    assert_eq!(fed, usize::from(SOFT_WD_BOOT_COUNTS));

    wd.refresh();
    let fed = (0..40).filter(|_| tb.on_tick(0, &wd).feed_watchdog).count();
    assert_eq!(fed, usize::from(SOFT_WD_COUNTS));
}

#[test]
fn published_status_selects_the_led_pattern() {
    let tb = SharedTimeBase::new(120);
    let wd = SoftWatchdog::new(u8::MAX, u8::MAX);

    tb.publish_status(StatusView { is_down: false, is_auto: false, auto_down_timer: 0 });
    assert!((0..80).all(|_| !tb.on_tick(0, &wd).status_led), "up/manual is dark");

    tb.publish_status(StatusView { is_down: true, is_auto: false, auto_down_timer: 0 });
    let lit = (0..80).filter(|_| tb.on_tick(0, &wd).status_led).count();
    assert!((36..=44).contains(&lit), "down/manual is lit half the frame, got {lit}");
}
