//! Rain detection with an adaptive threshold.
//!
//! The filtered swing of the measuring electrodes is compared with the swing
//! of the reference electrodes: water bridging the measuring pair lowers the
//! ratio `measure * 65536 / ref`. A pre-alarm is raised when the ratio falls
//! below the threshold.
//!
//! The threshold follows the water pot (the setpoint) but adapts to the
//! installation:
//!
//! * after a manual descent it is pulled just below the current ratio, so
//!   a still-wet detector does not immediately raise the awning again;
//! * while down it relaxes back towards the setpoint as the detector dries;
//! * while up in automatic mode it tracks halfway between the setpoint and
//!   the lowest ratio seen, so the awning only comes down once the detector
//!   is clearly drier than during the rain.
//!
//! Turning the pot snaps the threshold to the new setpoint.

/// Ratio reported when the reference channel reads zero.
pub const RATIO_DRY: u32 = 65_535;
/// Setpoint at the pot's zero end.
pub const SETPOINT_BASE: u32 = 8_192;
/// Setpoint change over two cycles that counts as a pot rotation.
pub const POT_ROTATION_DELTA: u32 = 1_000;
/// Distance kept below the ratio after a manual descent.
pub const MANUAL_MARGIN: u32 = 1_000;
/// Ratio margin above which the detector counts as drying.
pub const DRY_MARGIN: u32 = 5_000;
/// Threshold relaxation per second while drying.
pub const RELAX_STEP: u32 = 1_000;

/// `measure * 65536 / reference`, with a zero reference read as dry.
pub fn water_ratio(reference: u16, measure: u16) -> u32 {
    if reference == 0 {
        RATIO_DRY
    } else {
        (u32::from(measure) << 16) / u32::from(reference)
    }
}

/// Threshold setpoint selected by the water pot (8192 to 40959).
pub fn setpoint_from_pot(pot: u16) -> u32 {
    u32::from(pot >> 1) + SETPOINT_BASE
}

/// Awning situation the threshold adapts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterContext {
    pub is_down: bool,
    pub is_auto: bool,
    /// The down button is pressed this cycle.
    pub button_down: bool,
}

/// Result of one water evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaterSample {
    pub ratio: u32,
    /// Threshold the ratio was compared against.
    pub threshold: u32,
    pub setpoint: u32,
    pub pre_alarm: bool,
}

#[derive(Debug, Clone)]
pub struct WaterThresholdAdapter {
    threshold: u32,
    setpoint: u32,
    /// Setpoints of the previous two cycles, newest first.
    setpoint_history: [u32; 2],
    minimum_seen: u32,
}

impl WaterThresholdAdapter {
    pub const fn new() -> Self {
        Self {
            threshold: 0,
            setpoint: 0,
            setpoint_history: [0; 2],
            minimum_seen: u32::MAX,
        }
    }

    /// Run one cycle: compute the ratio, decide the pre-alarm against the
    /// current threshold, then adapt the threshold for the next cycle.
    pub fn evaluate(
        &mut self,
        reference: u16,
        measure: u16,
        pot: u16,
        ctx: WaterContext,
    ) -> WaterSample {
        let ratio = water_ratio(reference, measure);
        let compared = self.threshold;
        let pre_alarm = ratio < compared;

        let setpoint = setpoint_from_pot(pot);
        self.setpoint = setpoint;
        if setpoint.abs_diff(self.setpoint_history[1]) > POT_ROTATION_DELTA {
            self.threshold = setpoint;
        }
        self.setpoint_history = [setpoint, self.setpoint_history[0]];

        self.adapt(ratio, ctx);

        WaterSample {
            ratio,
            threshold: compared,
            setpoint,
            pre_alarm,
        }
    }

    fn adapt(&mut self, ratio: u32, ctx: WaterContext) {
        let setpoint = self.setpoint;
        match (ctx.is_down, ctx.is_auto) {
            (true, _) if ctx.button_down => {
                // Below the margin the threshold floors at zero, it never wraps.
                self.threshold = ratio.saturating_sub(MANUAL_MARGIN).min(setpoint);
            }
            (true, _) => {
                if self.threshold < setpoint {
                    if ratio > setpoint + DRY_MARGIN {
                        self.threshold = setpoint;
                    } else if ratio > self.threshold + DRY_MARGIN {
                        self.threshold = (self.threshold + RELAX_STEP).min(setpoint);
                    }
                } else {
                    self.threshold = setpoint;
                }
                self.minimum_seen = u32::MAX;
            }
            (false, true) => {
                if ratio < self.minimum_seen {
                    self.minimum_seen = ratio;
                    self.threshold = setpoint / 2 + self.minimum_seen / 2;
                }
            }
            (false, false) => self.threshold = setpoint,
        }
    }

    /// Threshold the next cycle will compare against.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn setpoint(&self) -> u32 {
        self.setpoint
    }

    pub fn minimum_seen(&self) -> u32 {
        self.minimum_seen
    }
}

impl Default for WaterThresholdAdapter {
    fn default() -> Self {
        Self::new()
    }
}
