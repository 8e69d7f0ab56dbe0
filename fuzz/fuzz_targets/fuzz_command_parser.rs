//! Fuzz target: command parser + state transition
//!
//! Feeds arbitrary payloads through `Command::parse_bytes` and applies the
//! result, verifying:
//! - No panics under arbitrary byte inputs
//! - A parsed threshold is always in 1..=99
//! - The state threshold stays in 1..=99 after every command
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use irrigator::app::commands::Command;
use irrigator::control::ControlState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut state = ControlState::default();

    // Split on NUL so one input exercises a command sequence.
    for payload in data.split(|&b| b == 0) {
        let cmd = Command::parse_bytes(payload);
        if let Command::SetThreshold(n) = cmd {
            assert!(n > 0 && n < 100, "parser accepted threshold {n}");
        }

        let before = state.clone();
        state.apply(&cmd);
        if cmd == Command::Unrecognized {
            assert_eq!(state, before, "unrecognized input changed state");
        }

        let t = state.threshold().get();
        assert!(t > 0 && t < 100, "threshold left range: {t}");
    }
});
