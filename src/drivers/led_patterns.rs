//! Status LED blink patterns.
//!
//! The time base calls [`LedPatternEngine::tick`] at 40 Hz. Every fourth
//! tick starts a new 0.1 s slot; twenty slots make a 2 s frame. The engine
//! is an explicit state machine over the tick count, so each pattern is a
//! set of lit slots:
//!
//! | Awning                        | Pattern                               |
//! |-------------------------------|---------------------------------------|
//! | up, manual                    | off                                   |
//! | down, manual                  | 1 s on, 1 s off                       |
//! | down, auto                    | 0.1 s on, 1.9 s off                   |
//! | up, auto, counting down       | 0.1 on, 0.2 off, 0.1 on, 1.6 off      |
//! | up, auto, alarm still present | continuous fast flash                 |
//!
//! The engine also marks the whole seconds of the time base (ticks 40 and
//! 80 of the frame).

const TICKS_PER_SLOT: u8 = 4;
/// Slot that closes the frame and wraps the tick counter.
const FRAME_SLOTS: u8 = 20;
/// Slot at the half-frame second boundary.
const HALF_FRAME_SLOT: u8 = 10;

/// What the LED reports, published by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusView {
    pub is_down: bool,
    pub is_auto: bool,
    pub auto_down_timer: u16,
}

/// Output of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub led: bool,
    /// A whole second elapsed with this tick.
    pub one_second: bool,
}

#[derive(Debug, Clone)]
pub struct LedPatternEngine {
    tick: u8,
    led: bool,
    /// Timer value meaning "alarm still present" (full auto-down delay).
    hold_secs: u16,
}

impl LedPatternEngine {
    pub const fn new(hold_secs: u16) -> Self {
        Self {
            tick: 0,
            led: false,
            hold_secs,
        }
    }

    pub fn tick(&mut self, status: StatusView) -> FrameTick {
        self.tick += 1;
        let mut one_second = false;

        if self.tick % TICKS_PER_SLOT == 0 {
            let manual_down = status.is_down && !status.is_auto;
            let auto_up = status.is_auto && !status.is_down;
            let holding = auto_up && status.auto_down_timer == self.hold_secs;
            let waiting = auto_up && status.auto_down_timer < self.hold_secs;

            match self.tick / TICKS_PER_SLOT {
                1 | 5 | 7 | 9 => self.led = manual_down,
                3 => self.led = manual_down || waiting,
                2 | 4 | 6 | 8 => self.led = manual_down || holding,
                HALF_FRAME_SLOT => {
                    one_second = true;
                    self.led = holding;
                }
                12 | 14 | 16 | 18 => self.led = holding,
                FRAME_SLOTS => {
                    self.tick = 0;
                    one_second = true;
                    self.led = status.is_down || status.is_auto;
                }
                _ => self.led = false,
            }
        }

        FrameTick {
            led: self.led,
            one_second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: u16 = 14_400;

    /// LED state during each of the twenty slots of one frame. Index 0 is
    /// the frame-closing slot.
    fn frame(status: StatusView) -> [bool; 20] {
        let mut engine = LedPatternEngine::new(HOLD);
        // Align on the frame boundary.
        for _ in 0..80 {
            engine.tick(status);
        }
        let mut slots = [false; 20];
        for slot in &mut slots {
            *slot = engine.tick(status).led;
            for _ in 1..TICKS_PER_SLOT {
                engine.tick(status);
            }
        }
        slots
    }

    fn lit(slots: [bool; 20]) -> Vec<usize> {
        slots.iter().enumerate().filter(|(_, on)| **on).map(|(i, _)| i).collect()
    }

    fn status(is_down: bool, is_auto: bool, auto_down_timer: u16) -> StatusView {
        StatusView { is_down, is_auto, auto_down_timer }
    }

    #[test]
    fn up_manual_is_dark() {
        assert!(lit(frame(status(false, false, 0))).is_empty());
    }

    #[test]
    fn down_manual_is_on_for_one_second() {
        assert_eq!(lit(frame(status(true, false, 0))), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn down_auto_blinks_briefly() {
        assert_eq!(lit(frame(status(true, true, 0))), vec![0]);
    }

    #[test]
    fn waiting_shows_a_double_blink() {
        assert_eq!(lit(frame(status(false, true, 100))), vec![0, 3]);
    }

    #[test]
    fn holding_flashes_fast() {
        assert_eq!(
            lit(frame(status(false, true, HOLD))),
            vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]
        );
    }

    #[test]
    fn marks_two_seconds_per_frame() {
        let mut engine = LedPatternEngine::new(HOLD);
        let seconds = (0..400)
            .filter(|_| engine.tick(StatusView::default()).one_second)
            .count();
        assert_eq!(seconds, 10);
    }
}
