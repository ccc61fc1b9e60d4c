//! Periodic timers using ESP-IDF's esp_timer API.
//!
//! Two periodic timers stand in for the interrupt contexts of the
//! controller:
//!
//! * **sampling** (240 Hz): finishes the conversion of the current
//!   schedule step, feeds the filter bank and applies the next excitation
//!   level, which then settles until the following callback converts it;
//! * **time base** (40 Hz): soft/hardware watchdog, seconds counter,
//!   anemometer snapshot and the green status LED.
//!
//! Callbacks run in the esp_timer task and only touch critical-section
//! protected state and atomics.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::drivers::hw_init::HwInitError;

#[cfg(target_os = "espidf")]
use crate::acquisition::ACQUISITION;
#[cfg(target_os = "espidf")]
use crate::config::{SAMPLE_RATE_HZ, TIME_BASE_HZ};
#[cfg(target_os = "espidf")]
use crate::drivers::{hw_init, watchdog};
#[cfg(target_os = "espidf")]
use crate::sensors::anemometer;
#[cfg(target_os = "espidf")]
use crate::timebase::TIME_BASE;

#[cfg(target_os = "espidf")]
static mut SAMPLING_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut TIME_BASE_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn sampling_cb(_arg: *mut core::ffi::c_void) {
    let channel = ACQUISITION.current_step().channel;
    // A failed conversion holds the step: the same level stays applied and
    // the channel is converted again next period.
    let Ok(raw) = hw_init::adc_read_16(channel) else {
        return;
    };
    let next = ACQUISITION.on_conversion_complete(raw);
    hw_init::ledc_set(hw_init::LEDC_CH_EXCITATION, next.excitation);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn time_base_cb(_arg: *mut core::ffi::c_void) {
    let out = TIME_BASE.on_tick(anemometer::pulse_count(), &watchdog::WATCHDOG);
    if out.feed_watchdog {
        watchdog::feed_hardware_watchdog();
    }
    hw_init::gpio_write(crate::pins::LED_GREEN_GPIO, out.status_led);
}

/// Create and start one periodic timer.
///
/// SAFETY: `handle` must point to one of the static timer handles and the
/// call must come from the main task before any callback fires.
#[cfg(target_os = "espidf")]
unsafe fn start_periodic(
    name: &'static core::ffi::CStr,
    callback: unsafe extern "C" fn(*mut core::ffi::c_void),
    period_us: u64,
    handle: *mut esp_timer_handle_t,
) -> Result<(), HwInitError> {
    let args = esp_timer_create_args_t {
        callback: Some(callback),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: name.as_ptr(),
        skip_unhandled_events: false,
    };
    let ret = unsafe { esp_timer_create(&args, handle) };
    if ret != ESP_OK {
        return Err(HwInitError::TimerFailed(ret));
    }
    let ret = unsafe { esp_timer_start_periodic(*handle, period_us) };
    if ret != ESP_OK {
        return Err(HwInitError::TimerFailed(ret));
    }
    Ok(())
}

/// Start the sampling and time-base timers.
#[cfg(target_os = "espidf")]
pub fn start_timers() -> Result<(), HwInitError> {
    // SAFETY: the handles are written here once at boot from the main task,
    // before any timer callback fires.
    unsafe {
        start_periodic(
            c"sampling",
            sampling_cb,
            1_000_000 / u64::from(SAMPLE_RATE_HZ),
            &raw mut SAMPLING_TIMER,
        )?;
        start_periodic(
            c"timebase",
            time_base_cb,
            1_000_000 / u64::from(TIME_BASE_HZ),
            &raw mut TIME_BASE_TIMER,
        )?;
    }
    info!("hw_timer: sampling@{SAMPLE_RATE_HZ}Hz + time base@{TIME_BASE_HZ}Hz started");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers() -> Result<(), HwInitError> {
    log::info!("hw_timer(sim): timers not started");
    Ok(())
}
