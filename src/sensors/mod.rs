//! Sensor drivers fed from interrupt context.
//!
//! The analog channels (rain detector, pots) go through the
//! [`acquisition`](crate::acquisition) pipeline; the anemometer is a plain
//! pulse counter.

pub mod anemometer;
