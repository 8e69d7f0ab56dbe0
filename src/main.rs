//! Irrigator firmware: main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  HardwareAdapter    OledDisplay    MqttTransport   NvsAdapter │
//! │  (Sensor+Actuator)  (Display)      (Transport)     (Storage)  │
//! │  WifiAdapter        LogEventSink   MonotonicClock  Watchdog   │
//! │                                                               │
//! │  ─────────────────── Port Trait Boundary ──────────────────   │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │  Controller (pure logic)                                │  │
//! │  │  ControlState · decide · ThresholdStore · CycleTimer    │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot order: storage, peripherals, display, WiFi, MQTT, controller.
//! Display and storage failures halt the device; everything after that
//! is retried from the loop.
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info};

use irrigator::adapters::device_id;
use irrigator::adapters::display::OledDisplay;
use irrigator::adapters::hardware::HardwareAdapter;
use irrigator::adapters::log_sink::LogEventSink;
use irrigator::adapters::mqtt::MqttTransport;
use irrigator::adapters::nvs::NvsAdapter;
use irrigator::adapters::time::MonotonicClock;
use irrigator::adapters::wifi::WifiAdapter;
use irrigator::app::controller::Controller;
use irrigator::control::ThresholdStore;
use irrigator::drivers::buzzer::BuzzerDriver;
use irrigator::drivers::hw_init;
use irrigator::drivers::relay::RelayDriver;
use irrigator::drivers::watchdog::Watchdog;
use irrigator::pins;
use irrigator::Error;
use irrigator::sensors::SensorHub;

const WATCHDOG_TIMEOUT_MS: u32 = 10_000;
/// Loop pacing; well under the shortest allowed cycle interval.
const LOOP_SLEEP_MS: u64 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Irrigator v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Persistent storage + config ────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => halt(&format!("NVS init failed: {e}")),
    };
    let config = nvs.load_or_seed();
    info!(
        "Config: broker={} cycle={}ms topics=[{}, {}, {}]",
        config.broker_url,
        config.cycle_interval_ms,
        config.topic_control,
        config.topic_data,
        config.topic_status
    );

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals(config.alert_freq_hz) {
        halt(&format!("HAL init failed: {e}"));
    }

    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut display = match OledDisplay::new(i2c, pins::OLED_I2C_ADDR) {
        Ok(d) => d,
        Err(e) => halt(&format!("OLED init failed: {e}")),
    };

    // ── 4. WiFi (blocking until associated) ───────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop, None)?;
    let mut wifi = WifiAdapter::new(esp_wifi, &config).map_err(Error::from)?;
    wifi.associate(config.association_poll_ms).map_err(Error::from)?;

    // ── 5. MQTT ───────────────────────────────────────────────
    let client_id = device_id::client_id(&config.client_id_prefix, &device_id::read_mac());
    let mut transport = MqttTransport::connect(&config, &client_id).map_err(Error::from)?;

    // ── 6. Controller ─────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut hw = HardwareAdapter::new(
        SensorHub::from_pins(),
        [
            RelayDriver::new(pins::RELAY_A_GPIO),
            RelayDriver::new(pins::RELAY_B_GPIO),
        ],
        BuzzerDriver::new(config.alert_duration_ms),
        clock,
    );
    let mut sink = LogEventSink::new();
    let mut controller = Controller::new(&config, ThresholdStore::new(nvs));
    controller.start(&mut sink);

    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);
    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let now = clock.uptime_ms();
        controller.poll(now, &mut hw, &mut display, &mut transport, &mut sink);
        hw.poll();
        wifi.poll(now);
        watchdog.feed();
        std::thread::sleep(Duration::from_millis(LOOP_SLEEP_MS));
    }
}

/// Unrecoverable boot fault: log and park.  The relays were never
/// energised, so the safe state is to do nothing.
fn halt(reason: &str) -> ! {
    error!("FATAL: {} — halting", reason);
    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}
