//! Actuator and display drivers, hardware initialisation, and the watchdog.

pub mod buzzer;
pub mod font;
pub mod hw_init;
pub mod relay;
pub mod ssd1306;
pub mod watchdog;
