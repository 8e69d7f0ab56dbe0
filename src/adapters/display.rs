//! OLED display adapter.
//!
//! Implements [`DisplayPort`] on top of the SSD1306 driver.  A frame is the
//! mode banner on page 0 and one status line per zone on pages 2 and 4;
//! every render redraws the full panel.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::info;

use crate::app::ports::{DisplayError, DisplayPort};
use crate::app::status::StatusFrame;
use crate::drivers::ssd1306::Ssd1306;

/// Display pages used for the banner and the two zone lines.
const LINE_PAGES: [usize; 3] = [0, 2, 4];

pub struct OledDisplay<I2C> {
    panel: Ssd1306<I2C>,
    frames: u32,
}

fn map_bus_error(kind: ErrorKind) -> DisplayError {
    match kind {
        ErrorKind::NoAcknowledge(_) => DisplayError::NotResponding,
        _ => DisplayError::BusError,
    }
}

impl<I2C: I2c> OledDisplay<I2C> {
    /// Initialise the panel.  An error here means the display is absent
    /// or dead; callers treat it as fatal.
    pub fn new(i2c: I2C, addr: u8) -> Result<Self, DisplayError> {
        let mut panel = Ssd1306::new(i2c, addr);
        panel.init().map_err(|e| map_bus_error(e.kind()))?;
        info!("OledDisplay: SSD1306 ready at 0x{:02X}", addr);
        Ok(Self { panel, frames: 0 })
    }

    /// Frames pushed since init.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn panel(&self) -> &Ssd1306<I2C> {
        &self.panel
    }
}

impl<I2C: I2c> DisplayPort for OledDisplay<I2C> {
    fn render(&mut self, frame: &StatusFrame) -> Result<(), DisplayError> {
        self.panel.clear();
        for (page, line) in LINE_PAGES.into_iter().zip(frame.lines()) {
            self.panel.draw_text(page, 0, line);
        }
        self.panel.flush().map_err(|e| map_bus_error(e.kind()))?;
        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }
}
