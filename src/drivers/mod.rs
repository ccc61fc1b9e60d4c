//! Interrupt-side drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod hw_timer;
pub mod led_patterns;
pub mod watchdog;
