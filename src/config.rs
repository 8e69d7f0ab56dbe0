//! System configuration parameters
//!
//! All tunable parameters for the irrigation controller.
//! Values are persisted in NVS on first boot and loaded from there on
//! every subsequent boot; a missing or corrupt blob falls back to defaults.

use serde::{Deserialize, Serialize};

/// Build-time WiFi credentials (`WIFI_SSID=... WIFI_PASS=... cargo build`).
const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(s) => s,
    None => "Wokwi-GUEST",
};
const WIFI_PASS: &str = match option_env!("WIFI_PASS") {
    Some(s) => s,
    None => "",
};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Network ---
    /// WiFi network name (station mode)
    pub wifi_ssid: String,
    /// WiFi passphrase (empty for open networks)
    pub wifi_pass: String,
    /// MQTT broker URL
    pub broker_url: String,
    /// Client-id prefix; a per-device hex suffix is appended
    pub client_id_prefix: String,

    // --- Topics ---
    /// Inbound command topic
    pub topic_control: String,
    /// Outbound telemetry topic
    pub topic_data: String,
    /// Outbound status topic
    pub topic_status: String,
    /// Payload published on the status topic after each (re)connect
    pub status_message: String,

    // --- Timing ---
    /// Control cycle period (milliseconds)
    pub cycle_interval_ms: u32,
    /// Delay between broker reconnect attempts (milliseconds)
    pub reconnect_delay_ms: u32,
    /// Poll interval while waiting for WiFi association (milliseconds)
    pub association_poll_ms: u32,

    // --- Sensors ---
    /// Raw ADC value mapped to 0%
    pub sensor_raw_min: u16,
    /// Raw ADC value mapped to 100%
    pub sensor_raw_max: u16,

    // --- Alert ---
    /// Buzzer tone frequency (Hz)
    pub alert_freq_hz: u32,
    /// Buzzer pulse length (milliseconds)
    pub alert_duration_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Network
            wifi_ssid: WIFI_SSID.into(),
            wifi_pass: WIFI_PASS.into(),
            broker_url: "mqtt://broker.emqx.io:1883".into(),
            client_id_prefix: "Riku-Dual-".into(),

            // Topics
            topic_control: "riku/garden/control".into(),
            topic_data: "riku/garden/full_data".into(),
            topic_status: "riku/garden/status".into(),
            status_message: "System Online".into(),

            // Timing
            cycle_interval_ms: 2000,
            reconnect_delay_ms: 5000,
            association_poll_ms: 500,

            // Sensors (12-bit ADC)
            sensor_raw_min: 0,
            sensor_raw_max: 4095,

            // Alert
            alert_freq_hz: 1000,
            alert_duration_ms: 100,
        }
    }
}
