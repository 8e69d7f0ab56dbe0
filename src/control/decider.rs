//! Per-cycle irrigation decision.
//!
//! [`decide`] is a pure function of the control state and the two moisture
//! percentages.  In Manual mode the moisture values are not consulted.

use super::{ControlState, Mode, ZoneId, ZONE_COUNT};

/// Mode-qualified status shown on the display.
///
/// Auto-off is a bare `OFF` while Auto-on is `AUTO-ON`; the asymmetry is part
/// of the display contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    AutoOn,
    Off,
    ManOn,
    ManOff,
}

impl StatusLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoOn => "AUTO-ON",
            Self::Off => "OFF",
            Self::ManOn => "MAN-ON",
            Self::ManOff => "MAN-OFF",
        }
    }
}

impl core::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneDecision {
    pub actuator_on: bool,
    pub label: StatusLabel,
}

/// Decision for both zones, indexed by [`ZoneId::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub zones: [ZoneDecision; ZONE_COUNT],
}

impl Decision {
    pub fn zone(&self, zone: ZoneId) -> ZoneDecision {
        self.zones[zone.index()]
    }

    pub fn actuators(&self) -> [bool; ZONE_COUNT] {
        self.zones.map(|z| z.actuator_on)
    }

    pub fn labels(&self) -> [StatusLabel; ZONE_COUNT] {
        self.zones.map(|z| z.label)
    }
}

pub fn decide(state: &ControlState, moisture_pct: [u8; ZONE_COUNT]) -> Decision {
    let zones = ZoneId::ALL.map(|zone| match state.mode() {
        Mode::Manual => {
            let on = state.manual_intent(zone);
            ZoneDecision {
                actuator_on: on,
                label: if on { StatusLabel::ManOn } else { StatusLabel::ManOff },
            }
        }
        Mode::Auto => {
            let on = moisture_pct[zone.index()] < state.threshold().get();
            ZoneDecision {
                actuator_on: on,
                label: if on { StatusLabel::AutoOn } else { StatusLabel::Off },
            }
        }
    });
    Decision { zones }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::Command;

    #[test]
    fn auto_waters_dry_zone_only() {
        let s = ControlState::default();
        let d = decide(&s, [25, 40]);
        assert_eq!(d.actuators(), [true, false]);
        assert_eq!(d.labels(), [StatusLabel::AutoOn, StatusLabel::Off]);
    }

    #[test]
    fn auto_comparison_is_strict() {
        let s = ControlState::default();
        let d = decide(&s, [30, 29]);
        assert_eq!(d.actuators(), [false, true]);
    }

    #[test]
    fn raised_threshold_changes_decision() {
        let mut s = ControlState::default();
        s.apply(&Command::SetThreshold(45));
        assert_eq!(decide(&s, [40, 50]).actuators(), [true, false]);
    }

    #[test]
    fn manual_ignores_moisture() {
        let mut s = ControlState::default();
        s.apply(&Command::SetZonePump { zone: ZoneId::A, on: true });
        for m in [[0, 0], [100, 100], [5, 95]] {
            let d = decide(&s, m);
            assert_eq!(d.actuators(), [true, false]);
            assert_eq!(d.labels(), [StatusLabel::ManOn, StatusLabel::ManOff]);
        }
    }

    #[test]
    fn auto_after_manual_uses_moisture() {
        let mut s = ControlState::default();
        s.apply(&Command::SetZonePump { zone: ZoneId::B, on: true });
        s.apply(&Command::SetAuto);
        let d = decide(&s, [10, 10]);
        assert_eq!(d.labels(), [StatusLabel::AutoOn, StatusLabel::AutoOn]);
    }

    #[test]
    fn label_strings() {
        assert_eq!(StatusLabel::AutoOn.to_string(), "AUTO-ON");
        assert_eq!(StatusLabel::Off.to_string(), "OFF");
        assert_eq!(StatusLabel::ManOn.to_string(), "MAN-ON");
        assert_eq!(StatusLabel::ManOff.to_string(), "MAN-OFF");
    }
}
