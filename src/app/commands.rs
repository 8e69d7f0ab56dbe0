//! Inbound commands to the controller.
//!
//! The remote protocol is a closed set of exact text tokens plus one numeric
//! form.  [`Command::parse`] is total: anything outside the vocabulary is
//! [`Command::Unrecognized`], never an error.

use crate::control::ZoneId;

/// A parsed control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Replace the dryness threshold.  Range is re-checked on apply.
    SetThreshold(i32),

    /// Switch to Manual mode and set one zone's pump.
    SetZonePump { zone: ZoneId, on: bool },

    /// Return to Auto mode.
    SetAuto,

    /// Anything else.  Dropped silently.
    Unrecognized,
}

/// Exact-match vocabulary.  No case folding, no trimming.
const VOCABULARY: [(&str, Command); 5] = [
    ("Pompa 1 Hidup", Command::SetZonePump { zone: ZoneId::A, on: true }),
    ("Pompa 1 Mati", Command::SetZonePump { zone: ZoneId::A, on: false }),
    ("Pompa 2 Hidup", Command::SetZonePump { zone: ZoneId::B, on: true }),
    ("Pompa 2 Mati", Command::SetZonePump { zone: ZoneId::B, on: false }),
    ("Otomatis", Command::SetAuto),
];

impl Command {
    pub fn parse(text: &str) -> Self {
        if text.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            return Self::parse_threshold(text);
        }
        VOCABULARY
            .iter()
            .find(|(token, _)| *token == text)
            .map_or(Self::Unrecognized, |(_, cmd)| *cmd)
    }

    /// Parse a raw transport payload.  Invalid UTF-8 is unrecognized.
    pub fn parse_bytes(payload: &[u8]) -> Self {
        core::str::from_utf8(payload).map_or(Self::Unrecognized, Self::parse)
    }

    /// Leading digit run only; trailing characters are ignored.
    fn parse_threshold(text: &str) -> Self {
        let end = text
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(text.len());
        match text[..end].parse::<i32>() {
            Ok(n) if n > 0 && n < 100 => Self::SetThreshold(n),
            _ => Self::Unrecognized,
        }
    }
}
