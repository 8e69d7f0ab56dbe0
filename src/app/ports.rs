//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, display, transport, storage) implement
//! these traits.  The [`Controller`](super::controller::Controller) consumes
//! them via generics, so the domain core never touches hardware directly.

use crate::config::SystemConfig;
use crate::control::ZoneId;

use super::status::StatusFrame;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain probe data.
pub trait SensorPort {
    /// Raw ADC reading of a zone's moisture probe.
    fn read_moisture_raw(&mut self, zone: ZoneId) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive a zone's pump relay.
    fn set_pump(&mut self, zone: ZoneId, on: bool);

    /// Level read back from the relay output line.
    fn pump_line(&self, zone: ZoneId) -> bool;

    /// Start one short alert tone.  Must not block.
    fn sound_alert(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    fn render(&mut self, frame: &StatusFrame) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ MQTT broker)
// ───────────────────────────────────────────────────────────────

pub const MAX_TOPIC_LEN: usize = 64;
pub const MAX_PAYLOAD_LEN: usize = 128;

/// One message delivered by the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<MAX_TOPIC_LEN>,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// `None` if the topic or payload exceed the fixed capacities.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = heapless::String::new();
        t.push_str(topic).ok()?;
        let p = heapless::Vec::from_slice(payload).ok()?;
        Some(Self { topic: t, payload: p })
    }
}

/// Broker session edge observed since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Up,
    Down,
}

/// Publish/subscribe transport.  Reconnection is the adapter's job; the
/// domain tracks session state from [`LinkEvent`]s alone.
pub trait TransportPort {
    /// Connection edge since the previous call, if any.
    fn poll_link(&mut self) -> Option<LinkEvent>;

    /// Next delivered message in arrival order.
    fn try_receive(&mut self) -> Option<InboundMessage>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting and
/// reject invalid ranges with [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Keys are namespaced to prevent collisions between subsystems.  Write
/// operations MUST be atomic — no partial writes on power loss.  The ESP-IDF
/// NVS API guarantees this natively.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`; a value
    /// longer than `buf` is an [`StorageError::IoError`], never truncated.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`TransportPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    NotConnected,
    PublishFailed,
    SubscribeFailed,
}

/// Errors from [`DisplayPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The panel did not acknowledge on the bus.
    NotResponding,
    /// A bus write failed mid-frame.
    BusError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
        }
    }
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotResponding => write!(f, "display not responding"),
            Self::BusError => write!(f, "display bus error"),
        }
    }
}
