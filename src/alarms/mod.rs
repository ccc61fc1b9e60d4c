//! Alarm supervisor.
//!
//! Runs once per second, after the wind meter and the water adapter have
//! produced this second's pre-alarms, and before the state machine. It owns
//! the alarm memory:
//!
//! * the water counter, counting consecutive wet seconds;
//! * the gust bank, counting gust events inside the gust window.
//!
//! The memory is cleared after every motion attempt and on manual override,
//! so an alarm always needs fresh evidence. The adaptive water threshold is
//! not part of the memory and survives a reset.

pub mod gust;
pub mod water;
pub mod wind;

use core::fmt;

use log::{debug, info, warn};

use crate::config::AwningConfig;
use gust::WindGustDetector;

/// Individual alarm conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlarmKind {
    WindPreAlarm = 0b0001,
    WaterPreAlarm = 0b0010,
    Wind = 0b0100,
    Water = 0b1000,
}

impl AlarmKind {
    pub const ALL: [Self; 4] = [Self::WindPreAlarm, Self::WaterPreAlarm, Self::Wind, Self::Water];

    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindPreAlarm => write!(f, "wind pre-alarm"),
            Self::WaterPreAlarm => write!(f, "water pre-alarm"),
            Self::Wind => write!(f, "WIND ALARM"),
            Self::Water => write!(f, "WATER ALARM"),
        }
    }
}

/// Bitmask of [`AlarmKind`]s active in one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmFlags(u8);

impl AlarmFlags {
    pub const NONE: Self = Self(0);

    pub const fn contains(self, kind: AlarmKind) -> bool {
        self.0 & kind.mask() != 0
    }

    #[must_use]
    pub const fn with(self, kind: AlarmKind) -> Self {
        Self(self.0 | kind.mask())
    }

    /// A wind or water alarm is active.
    pub const fn alarm(self) -> bool {
        self.contains(AlarmKind::Wind) || self.contains(AlarmKind::Water)
    }

    /// A wind or water pre-alarm is active.
    pub const fn pre_alarm(self) -> bool {
        self.contains(AlarmKind::WindPreAlarm) || self.contains(AlarmKind::WaterPreAlarm)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Display for AlarmFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "none");
        }
        let mut first = true;
        for kind in AlarmKind::ALL.into_iter().filter(|k| self.contains(*k)) {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{kind}")?;
            first = false;
        }
        Ok(())
    }
}

/// Alarm supervisor.
pub struct AlarmSupervisor {
    water_alarm_secs: u8,
    /// Consecutive seconds with a water pre-alarm.
    water_count: u8,
    gusts: WindGustDetector,
    /// Flags of the last evaluation, for edge logging.
    flags: AlarmFlags,
}

impl AlarmSupervisor {
    pub fn new(config: &AwningConfig) -> Self {
        Self {
            water_alarm_secs: config.water_alarm_secs,
            water_count: 0,
            gusts: WindGustDetector::new(config.gust_window_secs),
            flags: AlarmFlags::NONE,
        }
    }

    /// Fold this second's pre-alarms into the alarm memory.
    pub fn evaluate(&mut self, wind_pre: bool, water_pre: bool) -> AlarmFlags {
        self.water_count = if water_pre {
            self.water_count.saturating_add(1)
        } else {
            0
        };
        let wind_alarm = self.gusts.tick(wind_pre);

        let mut flags = AlarmFlags::NONE;
        for (kind, active) in [
            (AlarmKind::WindPreAlarm, wind_pre),
            (AlarmKind::WaterPreAlarm, water_pre),
            (AlarmKind::Wind, wind_alarm),
            (AlarmKind::Water, self.water_count >= self.water_alarm_secs),
        ] {
            self.log_edge(kind, active);
            if active {
                flags = flags.with(kind);
            }
        }
        self.flags = flags;
        flags
    }

    /// Clear the alarm memory.
    pub fn reset(&mut self) {
        if self.water_count > 0 || self.gusts.active() > 0 {
            debug!(
                "alarm memory cleared (water {}s, {} gusts)",
                self.water_count,
                self.gusts.active()
            );
        }
        self.water_count = 0;
        self.gusts.reset();
    }

    pub fn flags(&self) -> AlarmFlags {
        self.flags
    }

    pub fn water_count(&self) -> u8 {
        self.water_count
    }

    pub fn active_gusts(&self) -> usize {
        self.gusts.active()
    }

    fn log_edge(&self, kind: AlarmKind, active: bool) {
        let was = self.flags.contains(kind);
        match (was, active) {
            (false, true) if matches!(kind, AlarmKind::Wind | AlarmKind::Water) => {
                warn!("{kind} raised");
            }
            (false, true) => debug!("{kind} set"),
            (true, false) => info!("{kind} cleared"),
            _ => {}
        }
    }
}
