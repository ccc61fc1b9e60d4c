//! Wind gust detector.
//!
//! A gust event is a second in which the anemometer exceeded the wind
//! threshold. Each event occupies a countdown timer for the gust window;
//! the wind alarm fires when a new event arrives while every timer is still
//! running, i.e. on the N-th event within one window. The bank holds N-1
//! timers in a fixed array.

use crate::config::WIND_GUST_EVENTS;

/// Gust detector sized for the configured event count.
pub type WindGustDetector = GustDetector<{ WIND_GUST_EVENTS - 1 }>;

#[derive(Debug, Clone)]
pub struct GustDetector<const SLOTS: usize> {
    timers: [u8; SLOTS],
    window_secs: u8,
}

impl<const SLOTS: usize> GustDetector<SLOTS> {
    pub const fn new(window_secs: u8) -> Self {
        Self {
            timers: [0; SLOTS],
            window_secs,
        }
    }

    /// Advance the bank by one second and register this second's
    /// pre-alarm. Returns `true` when the wind alarm fires.
    pub fn tick(&mut self, pre_alarm: bool) -> bool {
        let mut active = 0;
        let mut free = None;
        for (slot, timer) in self.timers.iter_mut().enumerate() {
            *timer = timer.saturating_sub(1);
            if *timer > 0 {
                active += 1;
            } else if free.is_none() {
                free = Some(slot);
            }
        }

        if !pre_alarm {
            return false;
        }
        if active >= SLOTS {
            return true;
        }
        if let Some(slot) = free {
            self.timers[slot] = self.window_secs;
        }
        false
    }

    /// Number of events still inside the window.
    pub fn active(&self) -> usize {
        self.timers.iter().filter(|&&t| t > 0).count()
    }

    pub fn reset(&mut self) {
        self.timers = [0; SLOTS];
    }
}
