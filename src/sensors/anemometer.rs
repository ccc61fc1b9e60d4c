//! Cup anemometer pulse counter.
//!
//! The anemometer closes a reed contact a fixed number of times per
//! revolution. A GPIO ISR increments an atomic counter on each rising
//! edge; the time base reads it on every tick and snapshots it once per
//! second. Only the low 16 bits are consumed, as a free-running counter
//! whose differences are taken with wrapping arithmetic.

use core::sync::atomic::{AtomicU32, Ordering};

/// Global atomic counter incremented by the GPIO ISR.
/// `static` because ISR callbacks in ESP-IDF cannot capture closures.
static WIND_PULSE_COUNT: AtomicU32 = AtomicU32::new(0);

/// Called from the GPIO ISR on each rising edge.
pub fn wind_pulse_isr_handler() {
    WIND_PULSE_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Free-running 16-bit view of the pulse counter.
pub fn pulse_count() -> u16 {
    WIND_PULSE_COUNT.load(Ordering::Relaxed) as u16
}
