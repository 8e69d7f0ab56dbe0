//! Pump relay driver.
//!
//! One GPIO per zone, active HIGH.  The pin is configured input-output, so
//! [`RelayDriver::line_level`] reports what the pad actually carries rather
//! than what was last commanded.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real GPIO via hw_init helpers.
//! On host/test: the simulated GPIO bank in `hw_init::sim`.

use crate::drivers::hw_init;

pub struct RelayDriver {
    gpio: i32,
    commanded: bool,
}

impl RelayDriver {
    /// Take ownership of `gpio` and drive it low.
    pub fn new(gpio: i32) -> Self {
        hw_init::gpio_write(gpio, false);
        Self {
            gpio,
            commanded: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        if on != self.commanded {
            log::debug!("Relay GPIO{}: {}", self.gpio, if on { "ON" } else { "OFF" });
        }
        hw_init::gpio_write(self.gpio, on);
        self.commanded = on;
    }

    /// Level read back from the pad.
    pub fn line_level(&self) -> bool {
        hw_init::gpio_read(self.gpio)
    }
}
