//! Awning motor actuation.
//!
//! The motor is switched by three outputs: the auto-select relay (takes the
//! motor away from the manual switch), the direction relay and the power
//! TRIAC. Relays are only ever switched with the power off, and the
//! sequence always ends with all three outputs off.
//!
//! ## Sequence
//!
//! 1. Abort immediately, touching nothing, if the down button is pressed.
//! 2. Select auto and the direction, let the relays settle (button ignored:
//!    relay switching glitches the button input).
//! 3. Power the motor for the travel time; a button press stops it early.
//! 4. Power off, settle, then look at the button once more.
//! 5. If it was pressed at any point, wait for a full settle window with the
//!    button released before dropping the relays.
//!
//! The whole sequence blocks the control loop. The watchdog is refreshed
//! inside every wait.

pub mod wait;

use log::{info, warn};

use crate::app::ports::MotionHardware;
use crate::config::AwningConfig;
use wait::{WaitMode, WaitOutcome, wait_seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// How a motion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationResult {
    /// Full travel time elapsed.
    Completed,
    /// The down button was pressed before or during the motion.
    Interrupted,
}

/// Something that can move the awning.
///
/// The state machine only sees this seam; the service implements it over
/// the real sequence and the board I/O.
pub trait Motion {
    fn move_awning(&mut self, direction: Direction) -> ActuationResult;
}

/// Motor sequencer.
#[derive(Debug, Clone)]
pub struct Actuator {
    raise_travel_secs: u8,
    lower_travel_secs: u8,
    settle_secs: u8,
}

impl Actuator {
    pub fn new(config: &AwningConfig) -> Self {
        Self {
            raise_travel_secs: config.raise_travel_secs,
            lower_travel_secs: config.lower_travel_secs,
            settle_secs: config.relay_settle_secs,
        }
    }

    pub fn travel_secs(&self, direction: Direction) -> u8 {
        match direction {
            Direction::Up => self.raise_travel_secs,
            Direction::Down => self.lower_travel_secs,
        }
    }

    /// Run the full motion sequence in `direction`.
    pub fn move_awning<H>(&self, direction: Direction, hw: &mut H) -> ActuationResult
    where
        H: MotionHardware + ?Sized,
    {
        if hw.down_button_pressed() {
            warn!("Motion {:?} refused: down button held", direction);
            return ActuationResult::Interrupted;
        }

        info!(
            "Motion {:?}: start ({} s travel)",
            direction,
            self.travel_secs(direction)
        );
        hw.set_auto_select(true);
        hw.set_direction_down(direction == Direction::Down);
        self.settle(hw, |_| false);

        hw.set_power_drive(true);
        let travel = wait_seconds(
            hw,
            self.travel_secs(direction),
            WaitMode::Sleep,
            |hw| hw.refresh_watchdog(),
            |hw| hw.down_button_pressed(),
        );
        hw.set_power_drive(false);

        self.settle(hw, |_| false);
        let mut pressed = travel == WaitOutcome::Cancelled || hw.down_button_pressed();

        if !pressed {
            release_relays(hw);
            info!("Motion {:?}: completed", direction);
            return ActuationResult::Completed;
        }

        warn!("Motion {:?}: interrupted by the down button", direction);
        while pressed {
            pressed = self.settle(hw, |hw| hw.down_button_pressed()) == WaitOutcome::Cancelled;
        }
        release_relays(hw);
        ActuationResult::Interrupted
    }

    fn settle<H, C>(&self, hw: &mut H, cancel: C) -> WaitOutcome
    where
        H: MotionHardware + ?Sized,
        C: FnMut(&mut H) -> bool,
    {
        wait_seconds(
            hw,
            self.settle_secs,
            WaitMode::Busy,
            |hw| hw.refresh_watchdog(),
            cancel,
        )
    }
}

fn release_relays<H: MotionHardware + ?Sized>(hw: &mut H) {
    hw.set_direction_down(false);
    hw.set_auto_select(false);
}
