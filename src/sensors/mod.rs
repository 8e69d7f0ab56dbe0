//! Sensor subsystem — the moisture probe driver and the per-zone
//! [`SensorHub`] that the hardware adapter reads through.

pub mod moisture;

use crate::control::{ZoneId, ZONE_COUNT};
use crate::pins;
use moisture::MoistureProbe;

/// One probe per zone, indexed by [`ZoneId::index`].
pub struct SensorHub {
    probes: [MoistureProbe; ZONE_COUNT],
}

impl SensorHub {
    pub fn new(probes: [MoistureProbe; ZONE_COUNT]) -> Self {
        Self { probes }
    }

    /// Probes on the board's fixed ADC1 channels.
    pub fn from_pins() -> Self {
        Self::new([
            MoistureProbe::new(pins::ADC1_CH_MOISTURE_A, pins::MOISTURE_A_GPIO),
            MoistureProbe::new(pins::ADC1_CH_MOISTURE_B, pins::MOISTURE_B_GPIO),
        ])
    }

    pub fn read_raw(&mut self, zone: ZoneId) -> u16 {
        self.probes[zone.index()].read_raw()
    }
}

/// Inject a raw reading for `zone` into the simulated ADC.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_moisture_raw(zone: ZoneId, raw: u16) {
    let channel = match zone {
        ZoneId::A => pins::ADC1_CH_MOISTURE_A,
        ZoneId::B => pins::ADC1_CH_MOISTURE_B,
    };
    crate::drivers::hw_init::sim::set_adc(channel, raw);
}
