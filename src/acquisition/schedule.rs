//! Excitation and sampling schedule.
//!
//! The rain detector is excited with a stepped triangular waveform through a
//! PWM output. Each of the twelve steps pairs an excitation level with the
//! analog channel converted while that level is applied: the two water
//! channels are sampled at the waveform extremes, the calibration pots fill
//! the remaining slots.

use super::Channel;

/// Number of steps in one excitation period.
pub const SCHEDULE_LEN: usize = 12;

/// PWM duty (0-255) applied during each step.
pub const EXCITATION_TABLE: [u8; SCHEDULE_LEN] =
    [154, 103, 51, 0, 51, 103, 154, 103, 51, 0, 51, 103];

/// Channel converted during each step.
pub const CHANNEL_TABLE: [Channel; SCHEDULE_LEN] = [
    Channel::WaterRef,
    Channel::WindThresholdPot,
    Channel::WaterThresholdPot,
    Channel::WaterRef,
    Channel::WindThresholdPot,
    Channel::WaterThresholdPot,
    Channel::WaterMeasure,
    Channel::WindThresholdPot,
    Channel::WaterThresholdPot,
    Channel::WaterMeasure,
    Channel::WindThresholdPot,
    Channel::WaterThresholdPot,
];

/// One schedule step: what to drive and what to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub excitation: u8,
    pub channel: Channel,
}

/// Cursor over the fixed schedule.
#[derive(Debug, Clone)]
pub struct ExcitationSchedule {
    index: usize,
}

impl ExcitationSchedule {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Step whose conversion is currently in flight.
    pub const fn current(&self) -> Step {
        Self::step_at(self.index)
    }

    /// Move to the next step (modulo the period) and return it.
    pub fn advance(&mut self) -> Step {
        self.index = (self.index + 1) % SCHEDULE_LEN;
        self.current()
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    const fn step_at(index: usize) -> Step {
        Step {
            excitation: EXCITATION_TABLE[index],
            channel: CHANNEL_TABLE[index],
        }
    }
}

impl Default for ExcitationSchedule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_after_twelve_steps() {
        let mut sched = ExcitationSchedule::new();
        for _ in 0..SCHEDULE_LEN {
            sched.advance();
        }
        assert_eq!(sched.index(), 0);
        assert_eq!(sched.current(), Step { excitation: 154, channel: Channel::WaterRef });
    }

    #[test]
    fn water_channels_are_sampled_at_the_extremes() {
        for (i, ch) in CHANNEL_TABLE.iter().enumerate() {
            if ch.is_water() {
                let level = EXCITATION_TABLE[i];
                assert!(level == 0 || level == 154, "step {i} samples water at {level}");
            }
        }
    }

    #[test]
    fn each_water_channel_sees_both_polarities() {
        for ch in [Channel::WaterRef, Channel::WaterMeasure] {
            let levels: Vec<u8> = (0..SCHEDULE_LEN)
                .filter(|&i| CHANNEL_TABLE[i] == ch)
                .map(|i| EXCITATION_TABLE[i])
                .collect();
            assert_eq!(levels, vec![154, 0], "{ch:?}");
        }
    }

    #[test]
    fn pots_are_sampled_twice_as_often_as_water() {
        let count = |ch| CHANNEL_TABLE.iter().filter(|&&c| c == ch).count();
        assert_eq!(count(Channel::WaterRef), 2);
        assert_eq!(count(Channel::WaterMeasure), 2);
        assert_eq!(count(Channel::WindThresholdPot), 4);
        assert_eq!(count(Channel::WaterThresholdPot), 4);
    }
}
