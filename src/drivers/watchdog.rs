//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stops feeding it.  The loop calls
//! [`Watchdog::feed`] once per iteration; a blocked publish or a wedged I²C
//! transfer longer than the timeout trips it.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout_ms: u32,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: plain FFI calls on the main task.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
                } else {
                    warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self {
                    subscribed,
                    timeout_ms,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            if timeout_ms == 0 {
                warn!("Watchdog(sim): zero timeout");
            }
            info!("Watchdog(sim): no-op ({}ms)", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
