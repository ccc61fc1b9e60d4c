//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC channels of the rain detector and pots, the LEDC
//! channel generating the excitation waveform, the green status LED and
//! the anemometer input using raw ESP-IDF sys calls. Called once from
//! `main()` before the timers start.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::acquisition::Channel;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization. Each variant carries
/// the ESP-IDF error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    AdcConfigFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    IsrInstallFailed(i32),
    TimerFailed(i32),
    WatchdogFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (err {rc})"),
            Self::AdcConfigFailed(rc) => write!(f, "ADC config failed (err {rc})"),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (err {rc})"),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (err {rc})"),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (err {rc})"),
            Self::TimerFailed(rc) => write!(f, "esp_timer setup failed (err {rc})"),
            Self::WatchdogFailed(rc) => write!(f, "task watchdog setup failed (err {rc})"),
        }
    }
}

impl core::error::Error for HwInitError {}

/// ADC1 channel wired to each analog input.
pub const fn adc1_channel(channel: Channel) -> u32 {
    match channel {
        Channel::WaterRef => 3,
        Channel::WaterMeasure => 4,
        Channel::WindThresholdPot => 5,
        Channel::WaterThresholdPot => 6,
    }
}

pub const LEDC_CH_EXCITATION: u32 = 0;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the timers start; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: `ADC1_HANDLE` is written once in `init_adc()` before the
/// sampling timer starts; afterwards only the sampling callback reads it.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    for channel in Channel::ALL {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), adc1_channel(channel), &chan_cfg) };
        if ret != ESP_OK { return Err(HwInitError::AdcConfigFailed(ret)); }
    }

    info!("hw_init: ADC1 configured (CH3/4=rain detector, CH5/6=pots)");
    Ok(())
}

/// Conversions tried before a sample is given up for this period.
pub const ADC_READ_ATTEMPTS: u8 = 3;

/// Run `read` until it succeeds or `attempts` are used up, scaling the
/// 12-bit result to 16 bits. On failure returns the last error code.
pub fn read_with_retry<F>(attempts: u8, mut read: F) -> Result<u16, i32>
where
    F: FnMut() -> Result<i32, i32>,
{
    let mut last = 0;
    for _ in 0..attempts {
        match read() {
            Ok(raw) => return Ok((raw.clamp(0, 4095) as u16) << 4),
            Err(rc) => last = rc,
        }
    }
    Err(last)
}

/// Blocking conversion of `channel`, scaled from 12 to 16 bits.
#[cfg(target_os = "espidf")]
pub fn adc_read_16(channel: Channel) -> Result<u16, i32> {
    read_with_retry(ADC_READ_ATTEMPTS, || {
        let mut raw: i32 = 0;
        // SAFETY: adc1_handle() contract, sampling callback only.
        let ret = unsafe { adc_oneshot_read(adc1_handle(), adc1_channel(channel), &mut raw) };
        if ret == ESP_OK { Ok(raw) } else { Err(ret) }
    })
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio() -> Result<(), HwInitError> {
    let pulse_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::WIND_PULSE_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
    };
    let ret = unsafe { gpio_config(&pulse_cfg) };
    if ret != ESP_OK { return Err(HwInitError::GpioConfigFailed(ret)); }

    let led_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::LED_GREEN_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&led_cfg) };
    if ret != ESP_OK { return Err(HwInitError::GpioConfigFailed(ret)); }
    unsafe { gpio_set_level(pins::LED_GREEN_GPIO, 0) };

    info!("hw_init: GPIO configured (wind pulse input, green LED)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output configured in init_gpio().
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: excitation (20 kHz, 8-bit, RC-filtered on the board)
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::EXCITATION_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer0) };
    if ret != ESP_OK { return Err(HwInitError::LedcInitFailed(ret)); }

    let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: LEDC_CH_EXCITATION,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: pins::EXCITATION_PWM_GPIO,
        duty: u32::from(crate::acquisition::schedule::EXCITATION_TABLE[0]),
        hpoint: 0,
        ..Default::default()
    }) };
    if ret != ESP_OK { return Err(HwInitError::LedcInitFailed(ret)); }

    info!("hw_init: LEDC configured (excitation=CH0)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: the channel was configured in init_ledc(); only the sampling
    // callback writes its duty.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn wind_pulse_isr(_arg: *mut core::ffi::c_void) {
    crate::sensors::anemometer::wind_pulse_isr_handler();
}

/// Install the GPIO ISR service and register the anemometer handler.
/// Call after init_peripherals().
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed. The handler only bumps an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(pins::WIND_PULSE_GPIO, Some(wind_pulse_isr), core::ptr::null_mut());
        if ret != ESP_OK {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_intr_enable(pins::WIND_PULSE_GPIO);
    }
    info!("hw_init: ISR service installed (anemometer)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_channel_has_its_own_adc_input() {
        let mut seen = Channel::ALL.map(adc1_channel);
        seen.sort_unstable();
        assert_eq!(seen, [3, 4, 5, 6]);
    }

    #[test]
    fn error_display_carries_the_code() {
        assert_eq!(
            HwInitError::TimerFailed(259).to_string(),
            "esp_timer setup failed (err 259)"
        );
    }

    #[test]
    fn transient_read_failure_is_retried() {
        let mut calls = 0;
        let out = read_with_retry(ADC_READ_ATTEMPTS, || {
            calls += 1;
            if calls < 3 { Err(0x107) } else { Ok(4095) }
        });
        assert_eq!(out, Ok(0xFFF0));
        assert_eq!(calls, 3);
    }

    #[test]
    fn persistent_failure_yields_no_sample() {
        let mut calls = 0;
        let out = read_with_retry(ADC_READ_ATTEMPTS, || {
            calls += 1;
            Err(0x107)
        });
        assert_eq!(out, Err(0x107), "no zero sample may reach the filters");
        assert_eq!(calls, usize::from(ADC_READ_ATTEMPTS));
    }
}
