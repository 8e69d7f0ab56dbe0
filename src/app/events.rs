//! Outbound application events.
//!
//! The [`Controller`](super::controller::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them — log to serial, forward elsewhere, etc.

use crate::control::{Mode, Threshold, ZoneId};

use super::commands::Command;
use super::telemetry::TelemetrySnapshot;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller has started (carries the threshold loaded at boot).
    Started(Threshold),

    /// A command was received but had no effect.
    CommandIgnored(Command),

    /// Auto ↔ Manual.
    ModeChanged { from: Mode, to: Mode },

    /// A zone's manual intent was set.
    ManualIntent { zone: ZoneId, on: bool },

    /// Threshold replaced and persisted.
    ThresholdChanged(Threshold),

    /// At least one zone entered AUTO-ON this cycle; alert sounded.
    AlertSounded,

    /// Per-cycle telemetry snapshot.
    Telemetry(TelemetrySnapshot),

    /// Broker session established (`true`) or lost (`false`).
    Link(bool),
}
