//! Fuzz target: `WaterThresholdAdapter::evaluate`
//!
//! Each 7-byte record is one cycle: reference, measure, pot and a context
//! byte. The adapter must never panic on overflow and the pre-alarm must
//! always be the comparison against the reported threshold.
//!
//! cargo fuzz run fuzz_water_adapter

#![no_main]

use awning::alarms::water::{WaterContext, WaterThresholdAdapter, setpoint_from_pot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut water = WaterThresholdAdapter::new();

    for rec in data.chunks_exact(7) {
        let reference = u16::from_le_bytes([rec[0], rec[1]]);
        let measure = u16::from_le_bytes([rec[2], rec[3]]);
        let pot = u16::from_le_bytes([rec[4], rec[5]]);
        let ctx = WaterContext {
            is_down: rec[6] & 1 != 0,
            is_auto: rec[6] & 2 != 0,
            button_down: rec[6] & 4 != 0,
        };

        let sample = water.evaluate(reference, measure, pot, ctx);
        assert_eq!(sample.pre_alarm, sample.ratio < sample.threshold);
        assert_eq!(sample.setpoint, setpoint_from_pot(pot));
        if ctx.is_down {
            assert!(water.threshold() <= sample.setpoint);
        }
    }
});
