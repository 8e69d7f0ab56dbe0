//! Dryness threshold and its persistence.
//!
//! [`Threshold`] carries the (0, 100) exclusive-range invariant in its type,
//! so [`ControlState`](super::ControlState) can never hold an invalid value.
//! [`ThresholdStore`] owns the single persisted integer in NVS.

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};

pub const THRESHOLD_NAMESPACE: &str = "garden";
pub const THRESHOLD_KEY: &str = "threshold";

/// Moisture percentage below which Auto mode waters a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u8);

impl Threshold {
    /// Value used when nothing has been persisted yet.
    pub const DEFAULT: Threshold = Threshold(30);

    /// Accepts only `0 < n < 100`.
    pub fn new(n: i32) -> Option<Self> {
        if n > 0 && n < 100 {
            Some(Self(n as u8))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Display for Threshold {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Load/save of the persisted threshold over any [`StoragePort`].
///
/// The value is stored as a little-endian `i32` under
/// `garden::threshold`.  Range is enforced by callers at write time only;
/// `load` returns whatever was stored.
pub struct ThresholdStore<S> {
    storage: S,
}

impl<S: StoragePort> ThresholdStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Persisted value, or 30 if the key is absent or unreadable.
    pub fn load(&self) -> i32 {
        let mut buf = [0u8; 4];
        match self.storage.read(THRESHOLD_NAMESPACE, THRESHOLD_KEY, &mut buf) {
            Ok(4) => i32::from_le_bytes(buf),
            Ok(len) => {
                warn!("ThresholdStore: stored value has {} bytes, using default", len);
                i32::from(Threshold::DEFAULT.get())
            }
            Err(StorageError::NotFound) => {
                info!("ThresholdStore: nothing stored, using default");
                i32::from(Threshold::DEFAULT.get())
            }
            Err(e) => {
                warn!("ThresholdStore: read failed ({}), using default", e);
                i32::from(Threshold::DEFAULT.get())
            }
        }
    }

    /// Synchronous single-key write.  Failures are logged, not surfaced.
    pub fn save(&mut self, value: i32) {
        match self
            .storage
            .write(THRESHOLD_NAMESPACE, THRESHOLD_KEY, &value.to_le_bytes())
        {
            Ok(()) => info!("ThresholdStore: saved {}", value),
            Err(e) => warn!("ThresholdStore: save of {} failed ({})", value, e),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
