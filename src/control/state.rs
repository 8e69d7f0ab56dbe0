//! Authoritative control state and its transition function.
//!
//! [`ControlState::apply`] is pure: it mutates only the state it is called
//! on and reports what happened as an [`Outcome`].  Effects that leave the
//! process (persisting the threshold) are run by the controller after
//! inspecting the outcome.

use crate::app::commands::Command;

use super::{Threshold, ZoneId, ZONE_COUNT};

/// Who drives the pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Pumps follow moisture vs threshold.
    #[default]
    Auto,
    /// Pumps follow the last explicit per-zone command.
    Manual,
}

impl Mode {
    /// Banner line shown at the top of the display.
    pub const fn banner(self) -> &'static str {
        match self {
            Self::Auto => "--- AUTO MODE ---",
            Self::Manual => "--- MANUAL MODE ---",
        }
    }
}

/// Result of applying one [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Unrecognized input or out-of-range threshold; nothing changed.
    Ignored,
    /// Threshold replaced; must be persisted before the next cycle.
    ThresholdChanged(Threshold),
    /// A zone's manual intent was set (Manual mode is now active).
    ZoneIntentSet {
        zone: ZoneId,
        on: bool,
        entered_manual: bool,
    },
    /// Auto mode is active.
    AutoResumed { was_manual: bool },
}

impl Outcome {
    /// The threshold to persist, if this outcome requires a write.
    pub fn persist(&self) -> Option<Threshold> {
        match self {
            Self::ThresholdChanged(t) => Some(*t),
            _ => None,
        }
    }
}

/// Mode, threshold, and the two manual intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    mode: Mode,
    threshold: Threshold,
    manual_intent: [bool; ZONE_COUNT],
}

impl ControlState {
    /// Fresh state in Auto mode with both intents off.
    pub fn new(threshold: Threshold) -> Self {
        Self {
            mode: Mode::Auto,
            threshold,
            manual_intent: [false; ZONE_COUNT],
        }
    }

    /// Apply a command.  Never fails; invalid input is an [`Outcome::Ignored`].
    pub fn apply(&mut self, command: &Command) -> Outcome {
        match *command {
            Command::SetThreshold(n) => match Threshold::new(n) {
                Some(t) => {
                    self.threshold = t;
                    Outcome::ThresholdChanged(t)
                }
                None => Outcome::Ignored,
            },
            Command::SetZonePump { zone, on } => {
                let entered_manual = self.mode != Mode::Manual;
                self.mode = Mode::Manual;
                self.manual_intent[zone.index()] = on;
                Outcome::ZoneIntentSet {
                    zone,
                    on,
                    entered_manual,
                }
            }
            // Intents are kept; they are inert until Manual is re-entered.
            Command::SetAuto => {
                let was_manual = self.mode == Mode::Manual;
                self.mode = Mode::Auto;
                Outcome::AutoResumed { was_manual }
            }
            Command::Unrecognized => Outcome::Ignored,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn manual_intent(&self, zone: ZoneId) -> bool {
        self.manual_intent[zone.index()]
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(Threshold::DEFAULT)
    }
}
