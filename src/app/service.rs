//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, the alarm supervisor, the wind meter and
//! the water threshold adapter. All I/O flows through port traits injected
//! at call sites, making the entire control loop testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  ButtonPort ──▶ │          AppService           │
//!   ClockPort ──▶ │ wind · water · alarms · FSM   │ ──▶ StatusPort
//!   RelayPort ◀── │          Actuator             │ ──▶ WatchdogPort
//!                 └──────────────────────────────┘
//! ```
//!
//! One main-loop iteration ([`AppService::run_once`]) samples the button,
//! runs the one-second cycle when the time base has counted a new second,
//! refreshes the watchdog and idles until the next interrupt.

use log::info;

use crate::acquisition::Channel;
use crate::actuator::{ActuationResult, Actuator, Direction, Motion};
use crate::alarms::water::{WaterContext, WaterSample, WaterThresholdAdapter};
use crate::alarms::wind::{WindMeter, WindSample};
use crate::alarms::{AlarmFlags, AlarmSupervisor};
use crate::config::AwningConfig;
use crate::drivers::led_patterns::StatusView;
use crate::fsm::context::{FsmContext, Mode};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::events::{AppEvent, TelemetryData};
use super::ports::{AwningHardware, EventSink, MotionHardware};

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    alarms: AlarmSupervisor,
    wind: WindMeter,
    water: WaterThresholdAdapter,
    actuator: Actuator,
    last_wind: WindSample,
    last_water: WaterSample,
    telemetry_interval: u16,
    telemetry_countdown: u16,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: AwningConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Down),
            ctx: FsmContext::new(&config),
            alarms: AlarmSupervisor::new(&config),
            wind: WindMeter::new(),
            water: WaterThresholdAdapter::new(),
            actuator: Actuator::new(&config),
            last_wind: WindSample::default(),
            last_water: WaterSample::default(),
            telemetry_interval: config.telemetry_interval_secs,
            telemetry_countdown: config.telemetry_interval_secs,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its power-up state: down, automatic mode.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Main loop ─────────────────────────────────────────────

    /// One main-loop iteration. Returns the alarm flags when a one-second
    /// cycle ran.
    pub fn run_once<H>(&mut self, hw: &mut H, sink: &mut impl EventSink) -> Option<AlarmFlags>
    where
        H: AwningHardware + ?Sized,
    {
        let pressed = self.poll_button(hw.down_button_pressed(), sink);

        let snapshot = hw.time_snapshot();
        let flags = if self.wind.is_new_second(snapshot) {
            let pot = hw.read_filtered(Channel::WindThresholdPot);
            self.last_wind = self.wind.sample(snapshot, pot);
            Some(self.tick_one_second(self.last_wind.pre_alarm, pressed, hw, sink))
        } else {
            None
        };

        hw.publish_status(self.status());
        hw.refresh_watchdog();
        hw.idle();
        flags
    }

    /// Apply a down-button sample. A press means the user lowered the
    /// awning by hand: manual mode, position down, alarm memory cleared.
    /// Returns `pressed`.
    pub fn poll_button(&mut self, pressed: bool, sink: &mut impl EventSink) -> bool {
        if pressed {
            let was = (self.fsm.current_state(), self.ctx.mode);
            self.ctx.mode = Mode::Manual;
            self.fsm.force_transition(StateId::Down, &mut self.ctx);
            self.alarms.reset();
            if was != (StateId::Down, Mode::Manual) {
                info!("Manual override: down button pressed");
                sink.emit(&AppEvent::ManualOverride);
                if was.0 != StateId::Down {
                    sink.emit(&AppEvent::StateChanged { from: was.0, to: StateId::Down });
                }
            }
        }
        pressed
    }

    /// The one-second cycle: water adapter, warning LED, alarm counting,
    /// state machine.
    ///
    /// `wind_pre` is this second's wind pre-alarm, `button_pressed` the
    /// button sample of the current loop iteration.
    pub fn tick_one_second<H>(
        &mut self,
        wind_pre: bool,
        button_pressed: bool,
        hw: &mut H,
        sink: &mut impl EventSink,
    ) -> AlarmFlags
    where
        H: AwningHardware + ?Sized,
    {
        self.tick_count += 1;
        self.poll_button(button_pressed, sink);

        let water_ctx = WaterContext {
            is_down: self.fsm.current_state() == StateId::Down,
            is_auto: self.ctx.is_auto(),
            button_down: button_pressed,
        };
        self.last_water = self.water.evaluate(
            hw.read_filtered(Channel::WaterRef),
            hw.read_filtered(Channel::WaterMeasure),
            hw.read_filtered(Channel::WaterThresholdPot),
            water_ctx,
        );

        hw.set_warning_led(wind_pre || self.last_water.pre_alarm);

        let flags = self.alarms.evaluate(wind_pre, self.last_water.pre_alarm);
        if flags.alarm() {
            sink.emit(&AppEvent::AlarmRaised(flags));
        }
        self.ctx.alarms = flags;

        let prev_state = self.fsm.current_state();
        {
            let mut motion = MotionDriver {
                actuator: &self.actuator,
                hw: &mut *hw,
                sink: &mut *sink,
            };
            self.fsm.tick(&mut self.ctx, &mut motion);
        }
        if self.ctx.take_clear_request() {
            self.alarms.reset();
        }

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        self.telemetry_countdown = self.telemetry_countdown.saturating_sub(1);
        if self.telemetry_countdown == 0 {
            self.telemetry_countdown = self.telemetry_interval;
            sink.emit(&AppEvent::Telemetry(self.telemetry(flags)));
        }

        flags
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn mode(&self) -> Mode {
        self.ctx.mode
    }

    pub fn auto_down_timer(&self) -> u16 {
        self.ctx.auto_down_timer
    }

    /// What the status LED should show.
    pub fn status(&self) -> StatusView {
        StatusView {
            is_down: self.fsm.current_state() == StateId::Down,
            is_auto: self.ctx.is_auto(),
            auto_down_timer: self.ctx.auto_down_timer,
        }
    }

    pub fn alarm_supervisor(&self) -> &AlarmSupervisor {
        &self.alarms
    }

    pub fn water_adapter(&self) -> &WaterThresholdAdapter {
        &self.water
    }

    /// Number of completed one-second cycles.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    fn telemetry(&self, alarms: AlarmFlags) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            mode: self.ctx.mode,
            auto_down_timer: self.ctx.auto_down_timer,
            wind_pulses: self.last_wind.pulses,
            wind_threshold: self.last_wind.threshold,
            water_ratio: self.last_water.ratio,
            water_threshold: self.water.threshold(),
            water_setpoint: self.last_water.setpoint,
            water_count: self.alarms.water_count(),
            active_gusts: self.alarms.active_gusts() as u8,
            alarms,
        }
    }
}

/// [`Motion`] over the real sequence, reporting through the event sink.
struct MotionDriver<'a, H: ?Sized, S: ?Sized> {
    actuator: &'a Actuator,
    hw: &'a mut H,
    sink: &'a mut S,
}

impl<H, S> Motion for MotionDriver<'_, H, S>
where
    H: MotionHardware + ?Sized,
    S: EventSink + ?Sized,
{
    fn move_awning(&mut self, direction: Direction) -> ActuationResult {
        self.sink.emit(&AppEvent::MotionStarted(direction));
        let result = self.actuator.move_awning(direction, &mut *self.hw);
        self.sink.emit(&AppEvent::MotionFinished { direction, result });
        result
    }
}
