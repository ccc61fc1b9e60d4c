//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                     | Connects to                  |
//! |------------|--------------------------------|------------------------------|
//! | `hardware` | SensorPort, StatusPort         | shared acquisition/time base |
//! |            | RelayPort, ButtonPort          | relay, button, LED pins      |
//! |            | ClockPort, WatchdogPort        | time base, soft watchdog     |
//! | `log_sink` | EventSink                      | Serial log output            |

pub mod hardware;
pub mod log_sink;
