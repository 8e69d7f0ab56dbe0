//! Unified error type for the irrigation firmware.
//!
//! Each adapter reports its own small error enum; this module gathers them
//! into one [`Error`] so the boot path in `main` can use `?` uniformly.
//! All variants are `Copy`.

use core::fmt;

use crate::adapters::wifi::ConnectivityError;
use crate::app::ports::{ConfigError, DisplayError, StorageError, TransportError};
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible boot-time operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.
    Init(HwInitError),
    /// Persistent storage is unusable.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The OLED panel is absent or failing.
    Display(DisplayError),
    /// WiFi station could not be brought up.
    Wifi(ConnectivityError),
    /// Broker client could not be created.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Wifi(e) => write!(f, "wifi: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Wifi(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
