//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] for the irrigation
//! controller.
//!
//! - The config blob lives under `garden::syscfg` as postcard bytes and is
//!   range-checked before every save.
//! - The dryness threshold lives next to it under `garden::threshold`
//!   (written through [`StoragePort`] by the threshold store).
//! - ESP-IDF NVS commits are atomic per `nvs_commit()`, so a power cut never
//!   leaves a half-written value.

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort, MAX_TOPIC_LEN};
use crate::config::SystemConfig;
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "garden";
const CONFIG_KEY: &str = "syscfg";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 1024;

/// NVS namespace and key names are limited to 15 characters.
#[cfg(target_os = "espidf")]
const NVS_NAME_MAX: usize = 15;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably.  On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS use.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Load the stored config, or seed NVS with defaults when none exists.
    ///
    /// A corrupt blob is replaced by defaults too; a failed seed write is
    /// logged and the defaults are still returned.
    pub fn load_or_seed(&self) -> SystemConfig {
        match self.load() {
            Ok(cfg) if self.exists(CONFIG_NAMESPACE, CONFIG_KEY) => cfg,
            Ok(cfg) => {
                if let Err(e) = self.save(&cfg) {
                    log::warn!("NvsAdapter: could not seed default config: {}", e);
                }
                cfg
            }
            Err(e) => {
                log::warn!("NvsAdapter: stored config unusable ({}), reseeding", e);
                let cfg = SystemConfig::default();
                if let Err(e) = self.save(&cfg) {
                    log::warn!("NvsAdapter: could not reseed config: {}", e);
                }
                cfg
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Null-terminated copy of a namespace or key name.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_MAX + 1] {
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NVS_NAME_MAX);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn commit_blob(namespace: &str, key: &str, data: &[u8]) -> Result<(), i32> {
        let key = Self::c_name(key);
        Self::with_nvs_handle(namespace, true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
    }
}

fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if cfg.wifi_ssid.is_empty() || cfg.wifi_ssid.len() > 32 {
        return Err(ConfigError::ValidationFailed("wifi_ssid must be 1–32 bytes"));
    }
    if cfg.wifi_pass.len() > 64 {
        return Err(ConfigError::ValidationFailed("wifi_pass must be at most 64 bytes"));
    }
    if !(cfg.broker_url.starts_with("mqtt://") || cfg.broker_url.starts_with("mqtts://")) {
        return Err(ConfigError::ValidationFailed(
            "broker_url must start with mqtt:// or mqtts://",
        ));
    }
    if cfg.client_id_prefix.len() > 16 {
        return Err(ConfigError::ValidationFailed(
            "client_id_prefix must be at most 16 bytes",
        ));
    }
    for topic in [&cfg.topic_control, &cfg.topic_data, &cfg.topic_status] {
        if topic.is_empty() || topic.len() > MAX_TOPIC_LEN {
            return Err(ConfigError::ValidationFailed("topics must be 1–64 bytes"));
        }
    }
    if cfg.topic_control == cfg.topic_data || cfg.topic_control == cfg.topic_status {
        return Err(ConfigError::ValidationFailed(
            "topic_control must differ from the outbound topics",
        ));
    }
    if !(100..=60_000).contains(&cfg.cycle_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "cycle_interval_ms must be 100–60000",
        ));
    }
    if !(500..=60_000).contains(&cfg.reconnect_delay_ms) {
        return Err(ConfigError::ValidationFailed(
            "reconnect_delay_ms must be 500–60000",
        ));
    }
    if !(50..=5000).contains(&cfg.association_poll_ms) {
        return Err(ConfigError::ValidationFailed(
            "association_poll_ms must be 50–5000",
        ));
    }
    if cfg.sensor_raw_min >= cfg.sensor_raw_max || cfg.sensor_raw_max > 4095 {
        return Err(ConfigError::ValidationFailed(
            "sensor_raw_min must be < sensor_raw_max <= 4095",
        ));
    }
    if !(100..=10_000).contains(&cfg.alert_freq_hz) {
        return Err(ConfigError::ValidationFailed("alert_freq_hz must be 100–10000"));
    }
    if cfg.alert_duration_ms == 0 || cfg.alert_duration_ms >= cfg.cycle_interval_ms {
        return Err(ConfigError::ValidationFailed(
            "alert_duration_ms must be > 0 and shorter than the cycle",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            if let Some(bytes) = self.store.borrow().get(&key) {
                let cfg: SystemConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(CONFIG_KEY);
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
                let mut size: usize = 0;

                // First call: get size
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr() as *const _,
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg: SystemConfig =
                        postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(SystemConfig::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            match Self::commit_blob(CONFIG_NAMESPACE, CONFIG_KEY, &bytes) {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                // Same contract as nvs_get_blob: ESP_ERR_NVS_INVALID_LENGTH.
                Some(data) if data.len() > buf.len() => Err(StorageError::IoError),
                Some(data) => {
                    buf[..data.len()].copy_from_slice(data);
                    Ok(data.len())
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                // A namespace that was never written cannot be opened read-only.
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            Self::commit_blob(namespace, key, data).map_err(|e| {
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow().contains_key(&composite)
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let ret = unsafe {
                    nvs_find_key(handle, key.as_ptr() as *const _, core::ptr::null_mut())
                };
                Ok(ret == ESP_OK)
            });
            result.unwrap_or(false)
        }
    }
}
