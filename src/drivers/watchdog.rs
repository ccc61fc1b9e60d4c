//! Two-level watchdog.
//!
//! The hardware watchdog (an ESP-IDF task watchdog *user*, armed with a
//! short timeout) is fed from the 40 Hz time base, never from the main
//! loop. The time base only feeds it while the [`SoftWatchdog`] countdown
//! is non-zero, and decrements the countdown on every tick. The main loop
//! reloads the countdown on each iteration and inside every blocking wait.
//! A loop that stalls for more than [`SOFT_WD_COUNTS`] ticks therefore
//! starves the hardware watchdog and the chip resets.
//!
//! [`SOFT_WD_COUNTS`]: crate::config::SOFT_WD_COUNTS

use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::{SOFT_WD_BOOT_COUNTS, SOFT_WD_COUNTS};
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init::HwInitError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

/// Countdown reloaded by the main loop and consumed by the time base.
pub struct SoftWatchdog {
    countdown: AtomicU8,
    reload: u8,
}

impl SoftWatchdog {
    /// `initial` ticks of grace before the first refresh is required.
    pub const fn new(initial: u8, reload: u8) -> Self {
        Self {
            countdown: AtomicU8::new(initial),
            reload,
        }
    }

    /// Main loop: prove liveness for another `reload` ticks.
    pub fn refresh(&self) {
        self.countdown.store(self.reload, Ordering::Release);
    }

    /// Time base: returns whether the hardware watchdog may be fed this
    /// tick, consuming one count.
    ///
    /// Only the time base decrements, so the load/store pair cannot lose a
    /// decrement. A refresh racing in between is at worst delayed by one
    /// tick.
    pub fn service(&self) -> bool {
        let remaining = self.countdown.load(Ordering::Acquire);
        if remaining == 0 {
            return false;
        }
        self.countdown.store(remaining - 1, Ordering::Release);
        true
    }

    pub fn remaining(&self) -> u8 {
        self.countdown.load(Ordering::Acquire)
    }
}

/// Board-wide soft watchdog.
pub static WATCHDOG: SoftWatchdog = SoftWatchdog::new(SOFT_WD_BOOT_COUNTS, SOFT_WD_COUNTS);

#[cfg(target_os = "espidf")]
static mut HW_WDT_USER: esp_task_wdt_user_handle_t = core::ptr::null_mut();

/// Arm the hardware watchdog with `timeout_ms` and register the time
/// base as its only feeder.
#[cfg(target_os = "espidf")]
pub fn arm_hardware_watchdog(timeout_ms: u32) -> Result<(), HwInitError> {
    // SAFETY: called once from the main task before the time base starts,
    // so nothing reads HW_WDT_USER concurrently.
    unsafe {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        let ret = esp_task_wdt_reconfigure(&cfg);
        if ret != ESP_OK {
            log::warn!("TWDT reconfigure returned {} (initialising instead)", ret);
            let ret = esp_task_wdt_init(&cfg);
            if ret != ESP_OK {
                return Err(HwInitError::WatchdogFailed(ret));
            }
        }

        let ret = esp_task_wdt_add_user(c"timebase".as_ptr(), &raw mut HW_WDT_USER);
        if ret != ESP_OK {
            return Err(HwInitError::WatchdogFailed(ret));
        }
    }
    info!("Watchdog: armed ({timeout_ms} ms, fed by the time base)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_hardware_watchdog(_timeout_ms: u32) -> Result<(), crate::drivers::hw_init::HwInitError> {
    log::info!("Watchdog(sim): no-op");
    Ok(())
}

/// Feed the hardware watchdog. Called from the time base only.
#[cfg(target_os = "espidf")]
pub fn feed_hardware_watchdog() {
    // SAFETY: HW_WDT_USER is written once in arm_hardware_watchdog() before
    // the time base timer is started.
    unsafe {
        let user = HW_WDT_USER;
        if !user.is_null() {
            esp_task_wdt_reset_user(user);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn feed_hardware_watchdog() {}
