//! Application core — command protocol, orchestration, zero I/O.
//!
//! All interaction with hardware, the broker, and flash happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod controller;
pub mod events;
pub mod ports;
pub mod status;
pub mod telemetry;
