//! GPIO / peripheral pin assignments for the dual-zone controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Soil moisture probes (capacitive, analog out)
// ---------------------------------------------------------------------------

/// Zone A probe — ADC1 channel 6.
pub const MOISTURE_A_GPIO: i32 = 34;
/// Zone B probe — ADC1 channel 7.
pub const MOISTURE_B_GPIO: i32 = 35;

pub const ADC1_CH_MOISTURE_A: u32 = 6;
pub const ADC1_CH_MOISTURE_B: u32 = 7;

// ---------------------------------------------------------------------------
// Pump relays (active HIGH)
// ---------------------------------------------------------------------------

pub const RELAY_A_GPIO: i32 = 26;
pub const RELAY_B_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Piezo buzzer (LEDC square wave)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// I²C bus — SSD1306 OLED
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 400_000;
/// 7-bit SSD1306 address.
pub const OLED_I2C_ADDR: u8 = 0x3C;
