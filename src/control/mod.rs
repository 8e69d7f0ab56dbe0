//! Irrigation policy — zone identity, control state, and the decider.
//!
//! Everything here is pure: no port traits, no logging side effects that
//! matter for correctness.  The [`Controller`](crate::app::controller::Controller)
//! owns a [`ControlState`] and is the only caller that mutates it.

pub mod decider;
pub mod state;
pub mod threshold;

pub use decider::{decide, Decision, StatusLabel, ZoneDecision};
pub use state::{ControlState, Mode, Outcome};
pub use threshold::{Threshold, ThresholdStore};

/// Number of irrigation zones on the board.
pub const ZONE_COUNT: usize = 2;

/// Fixed identity of the two plant zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneId {
    A,
    B,
}

impl ZoneId {
    pub const ALL: [ZoneId; ZONE_COUNT] = [ZoneId::A, ZoneId::B];

    /// Array index for per-zone storage.
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Human label used on the display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "Plant A",
            Self::B => "Plant B",
        }
    }
}

/// Linear remap of a raw ADC reading onto 0–100 %.
///
/// The raw value is clamped into `raw_min..=raw_max` first so a noisy probe
/// can never produce a percentage outside 0–100.
pub fn moisture_percent(raw: u16, raw_min: u16, raw_max: u16) -> u8 {
    if raw_max <= raw_min {
        return 0;
    }
    let raw = raw.clamp(raw_min, raw_max);
    let span = u32::from(raw_max - raw_min);
    (u32::from(raw - raw_min) * 100 / span) as u8
}
