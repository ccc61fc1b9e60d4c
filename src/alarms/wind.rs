//! Wind speed pre-alarm from the anemometer pulse counter.
//!
//! The time base snapshots the free-running pulse counter once per second;
//! the difference between two consecutive snapshots is the wind speed in
//! pulses per second. A gap in the seconds sequence (the loop was blocked
//! in a motion) makes the difference meaningless, so it is discarded.

use crate::timebase::TimeSnapshot;

/// Threshold at the insensitive end of the wind pot, in pulses/s.
pub const MAX_WIND_THRESHOLD: u8 = 39;

/// Pulses/s threshold selected by the wind pot.
///
/// Ranges from 39 (pot at zero) down to 8 (pot at full scale).
pub fn threshold_from_pot(pot: u16) -> u8 {
    MAX_WIND_THRESHOLD - (pot >> 11) as u8
}

/// Result of one wind evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindSample {
    /// Pulses counted during the last second (0 if discarded).
    pub pulses: u8,
    pub threshold: u8,
    pub pre_alarm: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WindMeter {
    last: Option<TimeSnapshot>,
}

impl WindMeter {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// `true` when `snapshot` belongs to a second not evaluated yet.
    pub fn is_new_second(&self, snapshot: TimeSnapshot) -> bool {
        self.last.is_none_or(|last| last.seconds != snapshot.seconds)
    }

    /// Evaluate the wind over the second ending at `snapshot`.
    pub fn sample(&mut self, snapshot: TimeSnapshot, pot: u16) -> WindSample {
        let pulses = match self.last {
            Some(prev) if snapshot.seconds == prev.seconds.wrapping_add(1) => {
                snapshot.pulses.wrapping_sub(prev.pulses).min(255) as u8
            }
            _ => 0,
        };
        self.last = Some(snapshot);

        let threshold = threshold_from_pot(pot);
        WindSample {
            pulses,
            threshold,
            pre_alarm: pulses > threshold,
        }
    }
}
