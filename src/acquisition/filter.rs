//! Q15 first-order low-pass filters for the four analog channels.
//!
//! Water channels filter the magnitude of the sample-to-sample difference,
//! which for an AC-excited electrode pair is proportional to the
//! conductance between them. Pot channels filter the raw reading.

use super::Channel;

const Q15_ONE: u32 = 32_768;

/// Water channels: 40 samples/s per channel, time constant about 2 s.
pub const WATER_A_Q15: u32 = 32_361;
/// Pot channels: 80 samples/s per channel, time constant about 0.2 s.
pub const POT_A_Q15: u32 = 30_783;

/// One IIR step `y <- y*a + x*(1-a)` with `a` in Q15.
///
/// The intermediate fits in 32 bits: `65535 * 32768 < 2^32`.
#[inline]
pub fn iir_q15(y: u16, x: u16, a_q15: u32) -> u16 {
    ((u32::from(y) * a_q15 + u32::from(x) * (Q15_ONE - a_q15)) >> 15) as u16
}

/// Filter state for every channel.
#[derive(Debug, Clone)]
pub struct FilterBank {
    filtered: [u16; Channel::COUNT],
    /// Previous raw sample of the two water channels.
    previous: [u16; 2],
}

impl FilterBank {
    pub const fn new() -> Self {
        Self {
            filtered: [0; Channel::COUNT],
            previous: [0; 2],
        }
    }

    /// Feed one raw 16-bit sample and return the new filtered value.
    pub fn update(&mut self, channel: Channel, raw: u16) -> u16 {
        let i = channel.index();
        let y = self.filtered[i];
        self.filtered[i] = if channel.is_water() {
            let delta = raw.abs_diff(self.previous[i]);
            self.previous[i] = raw;
            iir_q15(y, delta, WATER_A_Q15)
        } else {
            iir_q15(y, raw, POT_A_Q15)
        };
        self.filtered[i]
    }

    pub fn read(&self, channel: Channel) -> u16 {
        self.filtered[channel.index()]
    }

    pub fn snapshot(&self) -> [u16; Channel::COUNT] {
        self.filtered
    }
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new()
    }
}
