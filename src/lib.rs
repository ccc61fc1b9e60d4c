//! Awning controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod acquisition;
pub mod actuator;
pub mod alarms;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod timebase;

// The ESP-IDF parts of these are guarded by cfg attributes inside; the
// host build gets stubs.
pub mod adapters;
pub mod drivers;
pub mod sensors;
