//! Device identity derived from the ESP32 factory MAC address.
//!
//! The broker client id is the configured prefix followed by the last two
//! MAC bytes in lowercase hex (`Riku-Dual-cafe`).  It is stable across
//! reboots, so a reconnect replaces the device's previous session rather
//! than colliding with another board.

use core::fmt::Write;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

pub type ClientIdString = heapless::String<32>;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: writes exactly six bytes into `mac`.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `prefix` + 16-bit hex suffix.  A prefix too long for the buffer is
/// truncated at a char boundary.
pub fn client_id(prefix: &str, mac: &MacAddress) -> ClientIdString {
    let suffix = u16::from_be_bytes([mac[4], mac[5]]);
    let mut id = ClientIdString::new();
    for c in prefix.chars() {
        if id.len() + c.len_utf8() + 4 > id.capacity() || id.push(c).is_err() {
            break;
        }
    }
    let _ = write!(id, "{:x}", suffix);
    id
}
