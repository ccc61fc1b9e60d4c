//! Blocking wait on the whole-second clock.
//!
//! Every wait in a motion sequence is one of these: it spins on the seconds
//! counter, refreshing the watchdog on every pass, optionally idling the
//! processor between passes and ending early when a cancellation predicate
//! fires.

use crate::app::ports::ClockPort;

/// How the waiting loop spends the time between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Keep polling.
    Busy,
    /// Idle until the next interrupt between polls.
    Sleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Wait until `secs` whole seconds have elapsed on the clock.
///
/// The watchdog is refreshed on every pass, then `cancel` is checked;
/// returning `true` ends the wait with [`WaitOutcome::Cancelled`]. `secs` must stay below
/// 128 so the wrapping difference of the seconds counter is unambiguous.
pub fn wait_seconds<H, R, C>(
    hw: &mut H,
    secs: u8,
    mode: WaitMode,
    mut refresh: R,
    mut cancel: C,
) -> WaitOutcome
where
    H: ClockPort + ?Sized,
    R: FnMut(&mut H),
    C: FnMut(&mut H) -> bool,
{
    let start = hw.seconds();
    while hw.seconds().wrapping_sub(start) < secs {
        refresh(hw);
        if cancel(hw) {
            return WaitOutcome::Cancelled;
        }
        if mode == WaitMode::Sleep {
            hw.idle();
        }
    }
    WaitOutcome::Elapsed
}
