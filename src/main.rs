//! Awning Controller Firmware: Main Entry Point
//!
//! Hexagonal architecture: two periodic timers own the interrupt side,
//! the main task runs the one-second control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  esp_timer 240 Hz: ADC → Q15 filters → next excitation level   │
//! │  esp_timer  40 Hz: watchdog · seconds · wind snapshot · LED    │
//! │  GPIO ISR:         anemometer pulse count                      │
//! │                                                                │
//! │  ─────────── shared cells (critical section / atomics) ─────   │
//! │                                                                │
//! │  HardwareAdapter (ports)          LogEventSink (EventSink)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   AppService: wind · water adapter · alarms · FSM      │    │
//! │  │   Actuator: relay sequencing                           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use awning::acquisition::ACQUISITION;
use awning::adapters::hardware::{HardwareAdapter, RelayPins};
use awning::adapters::log_sink::LogEventSink;
use awning::app::service::AppService;
use awning::config::{AwningConfig, HW_WATCHDOG_TIMEOUT_MS};
use awning::drivers::{hw_init, hw_timer, watchdog};
use awning::timebase::TIME_BASE;

/// One-shot raw peripheral setup, before any typed pin is taken.
fn bring_up_peripherals() -> awning::error::Result<()> {
    hw_init::init_peripherals()?;
    hw_init::init_isr_service()?;
    Ok(())
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Awning controller v{}            ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = AwningConfig::selected();
    config.validate().context("site configuration")?;
    info!(
        "Site {:?}: auto-down after {}s, travel up {}s / down {}s",
        config.site, config.auto_down_delay_secs, config.raise_travel_secs, config.lower_travel_secs
    );

    // ── 3. Raw peripherals (ADC, excitation PWM, LED, anemometer) ──
    bring_up_peripherals().context("peripheral bring-up")?;

    // ── 4. Typed pins for the control loop ────────────────────
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let mut button = PinDriver::input(pins.gpio9)?;
    button.set_pull(Pull::Up)?;
    let relays = RelayPins {
        auto_select: PinDriver::output(pins.gpio10)?,
        direction_down: PinDriver::output(pins.gpio11)?,
        triac_off: PinDriver::output(pins.gpio12)?,
    };
    let warning_led = PinDriver::output(pins.gpio14)?;

    let mut hw = HardwareAdapter::new(
        button,
        relays,
        warning_led,
        FreeRtos,
        &ACQUISITION,
        &TIME_BASE,
        &watchdog::WATCHDOG,
    );

    // ── 5. Watchdog, then the interrupt side ──────────────────
    watchdog::arm_hardware_watchdog(HW_WATCHDOG_TIMEOUT_MS).context("hardware watchdog")?;
    hw_timer::start_timers().context("timers")?;

    // ── 6. Application core ───────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config);
    app.start(&mut sink);

    info!("Entering control loop");
    loop {
        app.run_once(&mut hw, &mut sink);
    }
}
