//! GPIO / peripheral pin assignments for the awning controller board
//! (ESP32-S3).
//!
//! Single source of truth for the raw-sys drivers in `hw_init`. The
//! relay, button and warning LED pins are taken as typed
//! `esp_idf_hal` pins in `main`; keep both in step.

// ---------------------------------------------------------------------------
// Rain detector and calibration pots: Analog (ADC1)
// ---------------------------------------------------------------------------

/// Reference electrode pair. ADC1 channel 3.
pub const WATER_REF_GPIO: i32 = 4;
/// Measuring electrode pair. ADC1 channel 4.
pub const WATER_MEASURE_GPIO: i32 = 5;
/// Wind sensitivity pot. ADC1 channel 5.
pub const WIND_POT_GPIO: i32 = 6;
/// Water sensitivity pot. ADC1 channel 6.
pub const WATER_POT_GPIO: i32 = 7;

/// Excitation waveform for the rain detector, RC-filtered PWM.
pub const EXCITATION_PWM_GPIO: i32 = 15;
pub const EXCITATION_PWM_FREQ_HZ: u32 = 20_000;

// ---------------------------------------------------------------------------
// Anemometer: pulse input, interrupt-driven
// ---------------------------------------------------------------------------

pub const WIND_PULSE_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Motor outputs and manual button
// ---------------------------------------------------------------------------

/// Down push button, LOW while pressed (internal pull-up).
pub const BUTTON_DOWN_GPIO: i32 = 9;
/// Auto-select relay, active HIGH.
pub const RELAY_AUTO_GPIO: i32 = 10;
/// Direction relay, HIGH = down.
pub const RELAY_DOWN_GPIO: i32 = 11;
/// TRIAC gate driver, LOW = motor powered.
pub const TRIAC_OFF_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Green status LED, active HIGH, driven by the time base.
pub const LED_GREEN_GPIO: i32 = 13;
/// Red warning LED, active LOW.
pub const LED_RED_GPIO: i32 = 14;
