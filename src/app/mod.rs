//! Application core: pure domain logic, zero I/O.
//!
//! The business rules of the awning controller: the one-second control
//! cycle, alarm evaluation and the actuator state machine. All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
