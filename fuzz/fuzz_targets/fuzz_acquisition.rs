//! Fuzz target: `Acquisition::on_conversion_complete`
//!
//! Drives arbitrary 16-bit sample streams through the excitation schedule
//! and filter bank and asserts that the schedule keeps its period and the
//! water ratio of the filtered channels stays computable.
//!
//! cargo fuzz run fuzz_acquisition

#![no_main]

use awning::acquisition::schedule::SCHEDULE_LEN;
use awning::acquisition::{Acquisition, Channel};
use awning::alarms::water::water_ratio;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut acq = Acquisition::new();
    let start = acq.current_step();

    let mut conversions = 0usize;
    for chunk in data.chunks_exact(2) {
        acq.on_conversion_complete(u16::from_le_bytes([chunk[0], chunk[1]]));
        conversions += 1;
    }

    if conversions % SCHEDULE_LEN == 0 {
        assert_eq!(acq.current_step(), start, "schedule lost its period");
    }

    let ratio = water_ratio(acq.read(Channel::WaterRef), acq.read(Channel::WaterMeasure));
    assert!(ratio <= u32::from(u16::MAX) << 16);
});
