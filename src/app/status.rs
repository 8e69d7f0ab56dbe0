//! Render-ready status frame for the display.

use core::fmt::Write;

use crate::control::{Decision, Mode, ZoneId, ZONE_COUNT};

/// Longest zone line is `"Plant A: 100% MAN-OFF"` (21 chars).
pub const LINE_CAP: usize = 24;

pub type StatusLine = heapless::String<LINE_CAP>;

/// Banner plus one `"<label>: <pct>% <status>"` line per zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFrame {
    pub banner: &'static str,
    pub zones: [StatusLine; ZONE_COUNT],
}

impl StatusFrame {
    pub fn build(mode: Mode, moisture_pct: [u8; ZONE_COUNT], decision: &Decision) -> Self {
        let zones = ZoneId::ALL.map(|zone| {
            let mut line = StatusLine::new();
            let _ = write!(
                line,
                "{}: {}% {}",
                zone.label(),
                moisture_pct[zone.index()],
                decision.zone(zone).label
            );
            line
        });
        Self {
            banner: mode.banner(),
            zones,
        }
    }

    /// Lines top to bottom.
    pub fn lines(&self) -> [&str; ZONE_COUNT + 1] {
        [self.banner, self.zones[0].as_str(), self.zones[1].as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::Command;
    use crate::control::{decide, ControlState};

    #[test]
    fn auto_frame() {
        let s = ControlState::default();
        let d = decide(&s, [25, 40]);
        let f = StatusFrame::build(s.mode(), [25, 40], &d);
        assert_eq!(
            f.lines(),
            ["--- AUTO MODE ---", "Plant A: 25% AUTO-ON", "Plant B: 40% OFF"]
        );
    }

    #[test]
    fn manual_frame_fits_widest_line() {
        let mut s = ControlState::default();
        s.apply(&Command::SetZonePump { zone: ZoneId::B, on: true });
        let d = decide(&s, [100, 0]);
        let f = StatusFrame::build(s.mode(), [100, 0], &d);
        assert_eq!(
            f.lines(),
            ["--- MANUAL MODE ---", "Plant A: 100% MAN-OFF", "Plant B: 0% MAN-ON"]
        );
    }
}
