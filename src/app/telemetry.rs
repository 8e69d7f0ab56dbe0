//! Telemetry snapshot and its wire encoding.
//!
//! Wire format (compact JSON, fixed key order):
//!
//! ```text
//! {"s1":25,"s2":40,"p1":"ON","p2":"OFF","lim":30}
//! ```
//!
//! `p1`/`p2` carry the physical relay line level, not the status label.

use log::error;
use serde::Serialize;

use crate::control::{Threshold, ZONE_COUNT};

/// A point-in-time telemetry snapshot, produced once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub moisture_pct: [u8; ZONE_COUNT],
    pub actuator_on: [bool; ZONE_COUNT],
    pub threshold: Threshold,
}

#[derive(Serialize)]
enum LineState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl From<bool> for LineState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Field order here is the wire key order.
#[derive(Serialize)]
struct WireTelemetry {
    s1: u8,
    s2: u8,
    p1: LineState,
    p2: LineState,
    lim: u8,
}

impl TelemetrySnapshot {
    pub fn encode(&self) -> Vec<u8> {
        let wire = WireTelemetry {
            s1: self.moisture_pct[0],
            s2: self.moisture_pct[1],
            p1: self.actuator_on[0].into(),
            p2: self.actuator_on[1].into(),
            lim: self.threshold.get(),
        };
        // Integers and unit variants only; serialization cannot fail.
        serde_json::to_vec(&wire).unwrap_or_else(|e| {
            error!("telemetry encode failed: {}", e);
            Vec::new()
        })
    }
}
