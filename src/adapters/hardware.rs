//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], both pump relays and the buzzer, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  On non-espidf targets the
//! underlying drivers use the simulated peripheral bank.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::{ZoneId, ZONE_COUNT};
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::relay::RelayDriver;
use crate::sensors::SensorHub;

use super::time::MonotonicClock;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    relays: [RelayDriver; ZONE_COUNT],
    buzzer: BuzzerDriver,
    clock: MonotonicClock,
}

impl HardwareAdapter {
    pub fn new(
        sensor_hub: SensorHub,
        relays: [RelayDriver; ZONE_COUNT],
        buzzer: BuzzerDriver,
        clock: MonotonicClock,
    ) -> Self {
        Self {
            sensor_hub,
            relays,
            buzzer,
            clock,
        }
    }

    /// Housekeeping between cycles: ends an alert tone once it has run
    /// its length.
    pub fn poll(&mut self) {
        self.buzzer.poll(self.clock.uptime_ms());
    }

    pub fn buzzer(&self) -> &BuzzerDriver {
        &self.buzzer
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_moisture_raw(&mut self, zone: ZoneId) -> u16 {
        self.sensor_hub.read_raw(zone)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_pump(&mut self, zone: ZoneId, on: bool) {
        self.relays[zone.index()].set(on);
    }

    fn pump_line(&self, zone: ZoneId) -> bool {
        self.relays[zone.index()].line_level()
    }

    fn sound_alert(&mut self) {
        self.buzzer.start(self.clock.uptime_ms());
    }
}
