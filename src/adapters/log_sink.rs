//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART in production).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | A={}% B={}% | p1={} p2={} | lim={}",
                    t.moisture_pct[0],
                    t.moisture_pct[1],
                    if t.actuator_on[0] { "ON" } else { "OFF" },
                    if t.actuator_on[1] { "ON" } else { "OFF" },
                    t.threshold.get(),
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            AppEvent::ManualIntent { zone, on } => {
                info!("CMD   | {} pump {}", zone.label(), if *on { "ON" } else { "OFF" });
            }
            AppEvent::ThresholdChanged(t) => {
                info!("LIMIT | threshold now {}", t);
            }
            AppEvent::CommandIgnored(cmd) => {
                debug!("CMD   | ignored {:?}", cmd);
            }
            AppEvent::AlertSounded => {
                info!("ALERT | zone entered AUTO-ON");
            }
            AppEvent::Link(true) => {
                info!("LINK  | broker up");
            }
            AppEvent::Link(false) => {
                warn!("LINK  | broker down");
            }
            AppEvent::Started(t) => {
                info!("START | threshold={}", t);
            }
        }
    }
}
