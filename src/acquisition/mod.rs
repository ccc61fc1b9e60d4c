//! Analog acquisition pipeline.
//!
//! A periodic conversion interrupt walks the [`ExcitationSchedule`], feeds
//! every completed conversion into the [`FilterBank`] and immediately
//! applies the next excitation level. The control loop reads filtered values
//! through [`SharedAcquisition`], which serialises access with a critical
//! section so a read never observes a half-updated filter.

pub mod filter;
pub mod schedule;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

pub use filter::FilterBank;
pub use schedule::{ExcitationSchedule, Step};

/// Analog input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Reference electrode pair of the rain detector.
    WaterRef = 0,
    /// Measuring electrode pair of the rain detector.
    WaterMeasure = 1,
    /// Wind sensitivity pot.
    WindThresholdPot = 2,
    /// Water sensitivity pot.
    WaterThresholdPot = 3,
}

impl Channel {
    pub const COUNT: usize = 4;
    pub const ALL: [Self; Self::COUNT] = [
        Self::WaterRef,
        Self::WaterMeasure,
        Self::WindThresholdPot,
        Self::WaterThresholdPot,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_water(self) -> bool {
        matches!(self, Self::WaterRef | Self::WaterMeasure)
    }
}

/// Schedule plus filters, owned by the conversion interrupt.
#[derive(Debug, Clone)]
pub struct Acquisition {
    schedule: ExcitationSchedule,
    filters: FilterBank,
}

impl Acquisition {
    pub const fn new() -> Self {
        Self {
            schedule: ExcitationSchedule::new(),
            filters: FilterBank::new(),
        }
    }

    /// Route the sample of the conversion that just finished, advance the
    /// schedule and return the step to drive next.
    pub fn on_conversion_complete(&mut self, raw: u16) -> Step {
        let channel = self.schedule.current().channel;
        self.filters.update(channel, raw);
        self.schedule.advance()
    }

    /// Step whose conversion is in flight.
    pub fn current_step(&self) -> Step {
        self.schedule.current()
    }

    pub fn read(&self, channel: Channel) -> u16 {
        self.filters.read(channel)
    }

    pub fn filters(&self) -> &FilterBank {
        &self.filters
    }
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Acquisition`] shared between the conversion interrupt and the loop.
pub struct SharedAcquisition {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Acquisition>>,
}

impl SharedAcquisition {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Acquisition::new())),
        }
    }

    /// Interrupt side: see [`Acquisition::on_conversion_complete`].
    pub fn on_conversion_complete(&self, raw: u16) -> Step {
        self.inner
            .lock(|acq| acq.borrow_mut().on_conversion_complete(raw))
    }

    pub fn current_step(&self) -> Step {
        self.inner.lock(|acq| acq.borrow().current_step())
    }

    /// Filtered value of `channel`, read atomically with respect to the
    /// conversion interrupt.
    pub fn read_filtered(&self, channel: Channel) -> u16 {
        self.inner.lock(|acq| acq.borrow().read(channel))
    }

    /// All four filtered values from a single critical section.
    pub fn snapshot(&self) -> [u16; Channel::COUNT] {
        self.inner.lock(|acq| acq.borrow().filters().snapshot())
    }
}

impl Default for SharedAcquisition {
    fn default() -> Self {
        Self::new()
    }
}

/// Board-wide acquisition state, fed by the sampling timer.
pub static ACQUISITION: SharedAcquisition = SharedAcquisition::new();
