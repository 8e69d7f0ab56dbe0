//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to               |
//! |-------------|--------------------|---------------------------|
//! | `hardware`  | SensorPort         | ESP32 ADC1 (probes)       |
//! |             | ActuatorPort       | relay GPIO, LEDC buzzer   |
//! | `display`   | DisplayPort        | SSD1306 over I²C          |
//! | `mqtt`      | TransportPort      | ESP-IDF MQTT client       |
//! | `nvs`       | ConfigPort         | NVS / in-memory store     |
//! |             | StoragePort        |                           |
//! | `log_sink`  | EventSink          | Serial log output         |
//! | `wifi`      | —                  | ESP-IDF WiFi STA          |
//! | `time`      | —                  | ESP32 system timer        |
//! | `device_id` | —                  | factory MAC (client id)   |

pub mod device_id;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
