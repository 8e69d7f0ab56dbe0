//! Piezo buzzer driver (LEDC square wave).
//!
//! [`BuzzerDriver::start`] turns the tone on and records a deadline;
//! [`BuzzerDriver::poll`] silences it once the deadline passes.  Neither
//! call blocks, so an alert never stretches the control cycle.

use crate::drivers::hw_init::{self, BUZZER_ON_DUTY, LEDC_CH_BUZZER};

pub struct BuzzerDriver {
    duration_ms: u64,
    /// Uptime at which the current tone ends.
    until_ms: Option<u64>,
    pulses: u32,
}

impl BuzzerDriver {
    pub fn new(duration_ms: u32) -> Self {
        hw_init::ledc_set(LEDC_CH_BUZZER, 0);
        Self {
            duration_ms: u64::from(duration_ms),
            until_ms: None,
            pulses: 0,
        }
    }

    /// Begin a pulse.  A pulse already sounding is extended, not doubled.
    pub fn start(&mut self, now_ms: u64) {
        hw_init::ledc_set(LEDC_CH_BUZZER, BUZZER_ON_DUTY);
        self.until_ms = Some(now_ms.saturating_add(self.duration_ms));
        self.pulses = self.pulses.wrapping_add(1);
    }

    pub fn poll(&mut self, now_ms: u64) {
        if let Some(until) = self.until_ms {
            if now_ms >= until {
                self.silence();
            }
        }
    }

    fn silence(&mut self) {
        hw_init::ledc_set(LEDC_CH_BUZZER, 0);
        self.until_ms = None;
    }

    pub fn is_sounding(&self) -> bool {
        self.until_ms.is_some()
    }

    /// Pulses started since construction.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}
