//! Capacitive soil-moisture probe driver.
//!
//! One ADC1 oneshot conversion per read.  A failed conversion is logged
//! and the previous good value is returned, so a flaky probe cannot flip
//! a pump on by reading as bone-dry.  Before the first good read that
//! value is full scale (wet).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the channel configured by `hw_init`.
//! On host/test: reads the simulated ADC bank (`sim_set_moisture_raw`).

use log::warn;

use crate::drivers::hw_init;

pub const ADC_FULL_SCALE: u16 = 4095;

pub struct MoistureProbe {
    channel: u32,
    gpio: i32,
    last_good: u16,
    failures: u32,
}

impl MoistureProbe {
    pub fn new(channel: u32, gpio: i32) -> Self {
        Self {
            channel,
            gpio,
            last_good: ADC_FULL_SCALE,
            failures: 0,
        }
    }

    pub fn read_raw(&mut self) -> u16 {
        match hw_init::adc1_read(self.channel) {
            Ok(raw) => {
                self.last_good = raw.min(ADC_FULL_SCALE);
                self.last_good
            }
            Err(rc) => {
                self.failures = self.failures.saturating_add(1);
                warn!(
                    "Moisture GPIO{}: ADC read failed (rc={}), holding {}",
                    self.gpio, rc, self.last_good
                );
                self.last_good
            }
        }
    }

    /// Failed conversions since boot.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
