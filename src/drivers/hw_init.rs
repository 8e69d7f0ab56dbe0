//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 probe channels, the relay GPIOs, and the LEDC
//! timer/channel for the buzzer using raw ESP-IDF sys calls.  Called once
//! from `main()` before the control loop starts.
//!
//! Host builds replace the register accesses with a small simulated
//! peripheral bank (ADC values, GPIO levels, LEDC duty) so drivers can be
//! exercised under `cargo test`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

/// LEDC channel carrying the buzzer square wave.
pub const LEDC_CH_BUZZER: u32 = 0;

/// 50% duty at 8-bit resolution.
pub const BUZZER_ON_DUTY: u8 = 128;

#[cfg(target_os = "espidf")]
pub fn init_peripherals(buzzer_freq_hz: u32) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_adc()?;
        init_relay_outputs()?;
        init_ledc(buzzer_freq_hz)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(buzzer_freq_hz: u32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped (buzzer {} Hz)", buzzer_freq_hz);
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the init path or the main-loop read
/// path.  `init_adc()` completes before the loop starts.
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
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation: full 0–3.3 V probe swing, 12-bit result.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::ADC1_CH_MOISTURE_A, pins::ADC1_CH_MOISTURE_B] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!(
        "hw_init: ADC1 configured (CH{}=GPIO{}, CH{}=GPIO{})",
        pins::ADC1_CH_MOISTURE_A,
        pins::MOISTURE_A_GPIO,
        pins::ADC1_CH_MOISTURE_B,
        pins::MOISTURE_B_GPIO
    );
    Ok(())
}

/// One 12-bit conversion, or the ESP-IDF error code.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, i32> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK {
        return Err(ret);
    }
    Ok(raw.clamp(0, 4095) as u16)
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> Result<u16, i32> {
    sim::adc(channel)
}

// ── Relay outputs ─────────────────────────────────────────────

/// Relays are configured input-output so the driven level can be read
/// back from the pad for telemetry.
#[cfg(target_os = "espidf")]
unsafe fn init_relay_outputs() -> Result<(), HwInitError> {
    for pin in [pins::RELAY_A_GPIO, pins::RELAY_B_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!(
        "hw_init: relays configured (GPIO{}, GPIO{}), both off",
        pins::RELAY_A_GPIO,
        pins::RELAY_B_GPIO
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: register read on an already-configured pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::gpio_level(pin)
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured in init_relay_outputs(); main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::set_gpio_level(pin, high);
}

// ── LEDC (buzzer) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc(freq_hz: u32) -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: LEDC_CH_BUZZER,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::BUZZER_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!(
        "hw_init: LEDC configured (buzzer=CH{} on GPIO{}, {} Hz)",
        LEDC_CH_BUZZER,
        pins::BUZZER_GPIO,
        freq_hz
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: channel configured in init_ledc(); main loop is the only writer.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(channel: u32, duty: u8) {
    sim::set_ledc_duty(channel, duty);
}

// ── Simulated peripheral bank (host only) ─────────────────────

#[cfg(not(target_os = "espidf"))]
pub mod sim {
    //! Process-wide simulated registers.  Tests that touch them take
    //! [`lock`] first so parallel test threads do not interleave.

    use core::sync::atomic::{AtomicI32, AtomicU8, AtomicU64, Ordering};
    use std::sync::{Mutex, MutexGuard};

    const ADC_CHANNELS: usize = 10;
    const LEDC_CHANNELS: usize = 8;

    /// Negative values are injected read errors.
    static ADC: [AtomicI32; ADC_CHANNELS] = [const { AtomicI32::new(0) }; ADC_CHANNELS];
    /// One bit per GPIO number.
    static GPIO_LEVELS: AtomicU64 = AtomicU64::new(0);
    /// Pins whose pad level is forced regardless of the driven value.
    static GPIO_STUCK: AtomicU64 = AtomicU64::new(0);
    static LEDC_DUTY: [AtomicU8; LEDC_CHANNELS] = [const { AtomicU8::new(0) }; LEDC_CHANNELS];

    static LOCK: Mutex<()> = Mutex::new(());

    /// Serialise access to the simulated bank and reset it.
    pub fn lock() -> MutexGuard<'static, ()> {
        let guard = LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        reset();
        guard
    }

    pub fn reset() {
        for a in &ADC {
            a.store(0, Ordering::Relaxed);
        }
        GPIO_LEVELS.store(0, Ordering::Relaxed);
        GPIO_STUCK.store(0, Ordering::Relaxed);
        for d in &LEDC_DUTY {
            d.store(0, Ordering::Relaxed);
        }
    }

    pub fn set_adc(channel: u32, raw: u16) {
        if let Some(slot) = ADC.get(channel as usize) {
            slot.store(i32::from(raw), Ordering::Relaxed);
        }
    }

    /// Make the next reads of `channel` fail with `rc`.
    pub fn fail_adc(channel: u32, rc: i32) {
        if let Some(slot) = ADC.get(channel as usize) {
            slot.store(-rc.abs().max(1), Ordering::Relaxed);
        }
    }

    pub(super) fn adc(channel: u32) -> Result<u16, i32> {
        let v = ADC
            .get(channel as usize)
            .map_or(-1, |slot| slot.load(Ordering::Relaxed));
        if v < 0 { Err(v) } else { Ok(v.min(4095) as u16) }
    }

    fn bit(pin: i32) -> u64 {
        1u64 << (pin as u32 & 63)
    }

    pub(super) fn set_gpio_level(pin: i32, high: bool) {
        if is_stuck(pin) {
            return;
        }
        if high {
            GPIO_LEVELS.fetch_or(bit(pin), Ordering::Relaxed);
        } else {
            GPIO_LEVELS.fetch_and(!bit(pin), Ordering::Relaxed);
        }
    }

    pub fn gpio_level(pin: i32) -> bool {
        GPIO_LEVELS.load(Ordering::Relaxed) & bit(pin) != 0
    }

    /// Force the pad of `pin` to `level` (a welded relay contact, say).
    pub fn stick_gpio(pin: i32, level: bool) {
        GPIO_STUCK.fetch_or(bit(pin), Ordering::Relaxed);
        if level {
            GPIO_LEVELS.fetch_or(bit(pin), Ordering::Relaxed);
        } else {
            GPIO_LEVELS.fetch_and(!bit(pin), Ordering::Relaxed);
        }
    }

    fn is_stuck(pin: i32) -> bool {
        GPIO_STUCK.load(Ordering::Relaxed) & bit(pin) != 0
    }

    pub(super) fn set_ledc_duty(channel: u32, duty: u8) {
        if let Some(slot) = LEDC_DUTY.get(channel as usize) {
            slot.store(duty, Ordering::Relaxed);
        }
    }

    pub fn ledc_duty(channel: u32) -> u8 {
        LEDC_DUTY
            .get(channel as usize)
            .map_or(0, |slot| slot.load(Ordering::Relaxed))
    }
}
