//! System configuration parameters
//!
//! Every timing parameter of the controller is fixed at build time. Travel
//! and auto-down times depend on the installation (awning length, motor), so
//! they are grouped in [`SiteProfile`]s chosen with a cargo feature:
//! `site-living-room`, `site-bench`, or none for the attic installation.

use crate::error::{Error, Result};

/// Lifetime of one wind gust event, in seconds.
pub const WIND_GUST_TIME_SECS: u8 = 60;
/// Gust events within [`WIND_GUST_TIME_SECS`] that raise the wind alarm.
pub const WIND_GUST_EVENTS: usize = 5;
/// Consecutive wet seconds that raise the water alarm.
pub const WATER_ALARM_SECS: u8 = 4;
/// Time-base ticks the main loop may go without refreshing the watchdog.
pub const SOFT_WD_COUNTS: u8 = 4;
/// Grace period granted to start-up before the first refresh, in ticks.
pub const SOFT_WD_BOOT_COUNTS: u8 = 10;
/// Delay before an automatic descent after the awning went up.
pub const FOUR_HOURS_SECS: u16 = 14_400;
/// Relay settle time around every power-drive switch.
pub const RELAY_SETTLE_SECS: u8 = 2;
/// Time base frequency.
pub const TIME_BASE_HZ: u8 = 40;
/// Acquisition (A/D conversion) rate.
pub const SAMPLE_RATE_HZ: u32 = 240;
/// Hardware watchdog timeout, fed from the time base.
pub const HW_WATCHDOG_TIMEOUT_MS: u32 = 50;
/// Seconds between two telemetry reports.
pub const TELEMETRY_INTERVAL_SECS: u16 = 60;

/// Installation the firmware is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteProfile {
    /// Living-room awning.
    LivingRoom,
    /// Attic awning (default build).
    Attic,
    /// Bench testing: short travel, two-minute auto-down.
    Bench,
}

/// Site selected by the cargo features.
#[cfg(feature = "site-bench")]
pub const SELECTED_SITE: SiteProfile = SiteProfile::Bench;
#[cfg(all(feature = "site-living-room", not(feature = "site-bench")))]
pub const SELECTED_SITE: SiteProfile = SiteProfile::LivingRoom;
#[cfg(not(any(feature = "site-living-room", feature = "site-bench")))]
pub const SELECTED_SITE: SiteProfile = SiteProfile::Attic;

/// Core system configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwningConfig {
    pub site: SiteProfile,

    // --- Alarms ---
    /// Gust event lifetime (seconds)
    pub gust_window_secs: u8,
    /// Consecutive wet seconds before the water alarm
    pub water_alarm_secs: u8,

    // --- Motion ---
    /// Seconds the awning stays up (auto mode) before going down again
    pub auto_down_delay_secs: u16,
    /// Power-on time for a full raise
    pub raise_travel_secs: u8,
    /// Power-on time for a full descent
    pub lower_travel_secs: u8,
    /// Relay settle time before and after driving the motor
    pub relay_settle_secs: u8,

    // --- Reporting ---
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u16,
}

impl AwningConfig {
    /// Configuration for a given installation.
    pub const fn for_site(site: SiteProfile) -> Self {
        let (auto_down_delay_secs, raise_travel_secs, lower_travel_secs) = match site {
            SiteProfile::LivingRoom => (FOUR_HOURS_SECS, 35, 15),
            SiteProfile::Attic => (FOUR_HOURS_SECS, 40, 30),
            SiteProfile::Bench => (120, 10, 6),
        };
        Self {
            site,
            gust_window_secs: WIND_GUST_TIME_SECS,
            water_alarm_secs: WATER_ALARM_SECS,
            auto_down_delay_secs,
            raise_travel_secs,
            lower_travel_secs,
            relay_settle_secs: RELAY_SETTLE_SECS,
            telemetry_interval_secs: TELEMETRY_INTERVAL_SECS,
        }
    }

    /// Configuration of the site selected at build time.
    pub const fn selected() -> Self {
        Self::for_site(SELECTED_SITE)
    }

    /// Check the parameters against the limits of the wrapping 8-bit
    /// seconds counter and the gust detector.
    pub fn validate(&self) -> Result<()> {
        // Elapsed time is measured as a wrapping u8 difference.
        const MAX_WAIT_SECS: u8 = 127;

        if self.raise_travel_secs == 0 || self.lower_travel_secs == 0 {
            return Err(Error::Config("travel time must be non-zero"));
        }
        if self.raise_travel_secs > MAX_WAIT_SECS
            || self.lower_travel_secs > MAX_WAIT_SECS
            || self.relay_settle_secs > MAX_WAIT_SECS
        {
            return Err(Error::Config("wait longer than the seconds counter range"));
        }
        if usize::from(self.gust_window_secs) < WIND_GUST_EVENTS {
            return Err(Error::Config("gust window shorter than the gust count"));
        }
        if self.water_alarm_secs == 0 {
            return Err(Error::Config("water alarm needs at least one wet second"));
        }
        if self.telemetry_interval_secs == 0 {
            return Err(Error::Config("telemetry interval must be non-zero"));
        }
        Ok(())
    }
}

impl Default for AwningConfig {
    fn default() -> Self {
        Self::selected()
    }
}
