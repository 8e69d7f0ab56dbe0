//! WiFi station-mode adapter.
//!
//! Two phases:
//!
//! 1. **Startup** — [`WifiAdapter::associate`] blocks, polling the link at
//!    a fixed interval until the station is associated and has an IP.
//!    Nothing else in the firmware needs the network before this point.
//! 2. **Running** — [`WifiAdapter::poll`] is called from the control loop.
//!    It never blocks: a lost link is noticed, and a new association is
//!    requested at most once per retry delay.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi`.
//! - **all other targets**: an in-memory access point that tests can take
//!   away and bring back.

use core::fmt;
use log::{info, warn};

use crate::config::SystemConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    DriverFailed,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::DriverFailed => write!(f, "WiFi driver configuration failed"),
            Self::ConnectionFailed => write!(f, "WiFi association request failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    /// Association requested; waiting for link + IP.
    Associating,
    Connected,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

fn credentials(
    config: &SystemConfig,
) -> Result<(heapless::String<32>, heapless::String<64>), ConnectivityError> {
    validate_ssid(&config.wifi_ssid)?;
    validate_password(&config.wifi_pass)?;

    let mut ssid = heapless::String::new();
    ssid.push_str(&config.wifi_ssid)
        .map_err(|_| ConnectivityError::InvalidSsid)?;
    let mut password = heapless::String::new();
    password
        .push_str(&config.wifi_pass)
        .map_err(|_| ConnectivityError::InvalidPassword)?;
    Ok((ssid, password))
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    retry_delay_ms: u64,
    last_attempt_ms: u64,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    driver: EspWifi<'static>,
    /// Simulation: whether the access point is reachable.
    #[cfg(not(target_os = "espidf"))]
    sim_ap_available: bool,
    /// Simulation: association requested and granted.
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: EspWifi<'static>, config: &SystemConfig) -> Result<Self, ConnectivityError> {
        let (ssid, password) = credentials(config)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid,
            password,
            retry_delay_ms: u64::from(config.reconnect_delay_ms),
            last_attempt_ms: 0,
            attempts: 0,
            driver,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(config: &SystemConfig) -> Result<Self, ConnectivityError> {
        let (ssid, password) = credentials(config)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid,
            password,
            retry_delay_ms: u64::from(config.reconnect_delay_ms),
            last_attempt_ms: 0,
            attempts: 0,
            sim_ap_available: true,
            sim_associated: false,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    /// Association requests issued since boot.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Block until associated, checking the link every `poll_ms`.
    ///
    /// The association request is re-issued every retry delay while
    /// waiting.  Returns the number of polls it took.
    pub fn associate(&mut self, poll_ms: u32) -> Result<u32, ConnectivityError> {
        self.platform_start()?;
        info!("WiFi: connecting to '{}'", self.ssid);

        let mut waited_ms: u64 = 0;
        let mut polls: u32 = 0;
        self.request_association(0);

        while !self.platform_link_up() {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(poll_ms)));
            polls += 1;
            waited_ms += u64::from(poll_ms);
            if waited_ms.saturating_sub(self.last_attempt_ms) >= self.retry_delay_ms {
                warn!("WiFi: still not associated after {}ms, retrying", waited_ms);
                self.request_association(waited_ms);
            }
        }

        self.state = WifiState::Connected;
        info!("WiFi: connected after {} polls", polls);
        Ok(polls)
    }

    /// Non-blocking link supervision.  `now_ms` is monotonic uptime.
    pub fn poll(&mut self, now_ms: u64) {
        let up = self.platform_link_up();
        match self.state {
            WifiState::Connected if !up => {
                warn!("WiFi: link lost");
                self.state = WifiState::Disconnected;
            }
            WifiState::Associating if up => {
                info!("WiFi: re-associated (attempt {})", self.attempts);
                self.state = WifiState::Connected;
            }
            WifiState::Disconnected | WifiState::Associating => {
                if now_ms.wrapping_sub(self.last_attempt_ms) >= self.retry_delay_ms {
                    self.request_association(now_ms);
                }
            }
            WifiState::Connected => {}
        }
    }

    fn request_association(&mut self, now_ms: u64) {
        self.last_attempt_ms = now_ms;
        self.attempts = self.attempts.wrapping_add(1);
        match self.platform_connect() {
            Ok(()) => self.state = WifiState::Associating,
            Err(e) => {
                warn!("WiFi: {}", e);
                self.state = WifiState::Disconnected;
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let cfg = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.driver.set_configuration(&cfg).map_err(|e| {
            warn!("WiFi: set_configuration failed: {}", e);
            ConnectivityError::DriverFailed
        })?;
        self.driver.start().map_err(|e| {
            warn!("WiFi: start failed: {}", e);
            ConnectivityError::DriverFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi(sim): station started");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.driver
            .connect()
            .map_err(|_| ConnectivityError::ConnectionFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if !self.sim_ap_available {
            self.sim_associated = false;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_associated = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.driver.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        self.sim_associated && self.sim_ap_available
    }

    /// Simulation: take the access point away or bring it back.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_ap_available(&mut self, available: bool) {
        self.sim_ap_available = available;
        if !available {
            self.sim_associated = false;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
