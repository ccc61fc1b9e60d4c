//! 40 Hz time base.
//!
//! The time-base tick is the only place that:
//!
//! * feeds the hardware watchdog (gated by the soft watchdog countdown);
//! * advances the wrapping seconds counter, snapshotting the anemometer
//!   pulse counter at every whole second;
//! * drives the green status LED.
//!
//! The control loop reads `(seconds, pulses)` as one [`TimeSnapshot`] and
//! publishes its [`StatusView`] back for the LED patterns. Both directions
//! go through one critical-section mutex.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::config::AwningConfig;
use crate::drivers::led_patterns::{LedPatternEngine, StatusView};
use crate::drivers::watchdog::SoftWatchdog;

/// Whole seconds and anemometer pulses counted at the last second boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSnapshot {
    pub seconds: u8,
    pub pulses: u16,
}

/// What the tick asks the board glue to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutput {
    pub feed_watchdog: bool,
    pub status_led: bool,
}

#[derive(Debug, Clone)]
pub struct TimeBase {
    snapshot: TimeSnapshot,
    /// Pulse counter seen on the previous tick.
    last_pulses: u16,
    status: StatusView,
    led: LedPatternEngine,
}

impl TimeBase {
    pub const fn new(auto_down_delay_secs: u16) -> Self {
        Self {
            snapshot: TimeSnapshot { seconds: 0, pulses: 0 },
            last_pulses: 0,
            status: StatusView {
                is_down: true,
                is_auto: true,
                auto_down_timer: 0,
            },
            led: LedPatternEngine::new(auto_down_delay_secs),
        }
    }

    /// One 25 ms tick. `raw_pulses` is the free-running anemometer counter.
    pub fn on_tick(&mut self, raw_pulses: u16, watchdog: &SoftWatchdog) -> TickOutput {
        let feed_watchdog = watchdog.service();

        let frame = self.led.tick(self.status);
        if frame.one_second {
            self.snapshot = TimeSnapshot {
                seconds: self.snapshot.seconds.wrapping_add(1),
                pulses: self.last_pulses,
            };
        }

        // Wind activity shows as a flicker while the awning is out.
        let mut status_led = frame.led;
        if raw_pulses != self.last_pulses {
            if self.status.is_down {
                status_led = !status_led;
            }
            self.last_pulses = raw_pulses;
        }

        TickOutput {
            feed_watchdog,
            status_led,
        }
    }

    pub fn snapshot(&self) -> TimeSnapshot {
        self.snapshot
    }

    pub fn publish_status(&mut self, status: StatusView) {
        self.status = status;
    }
}

/// [`TimeBase`] shared between the tick callback and the control loop.
pub struct SharedTimeBase {
    inner: Mutex<CriticalSectionRawMutex, RefCell<TimeBase>>,
}

impl SharedTimeBase {
    pub const fn new(auto_down_delay_secs: u16) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(TimeBase::new(auto_down_delay_secs))),
        }
    }

    pub fn on_tick(&self, raw_pulses: u16, watchdog: &SoftWatchdog) -> TickOutput {
        self.inner
            .lock(|tb| tb.borrow_mut().on_tick(raw_pulses, watchdog))
    }

    /// Seconds and pulse snapshot, read together.
    pub fn snapshot(&self) -> TimeSnapshot {
        self.inner.lock(|tb| tb.borrow().snapshot())
    }

    pub fn seconds(&self) -> u8 {
        self.snapshot().seconds
    }

    pub fn publish_status(&self, status: StatusView) {
        self.inner.lock(|tb| tb.borrow_mut().publish_status(status));
    }
}

/// Board-wide time base, driven by the 40 Hz timer.
pub static TIME_BASE: SharedTimeBase =
    SharedTimeBase::new(AwningConfig::selected().auto_down_delay_secs);
