//! SSD1306 128×64 OLED driver over `embedded-hal` I²C.
//!
//! Text-only: a local framebuffer is drawn with the 5×7 font in
//! [`super::font`] and pushed to the panel in one horizontal-addressing
//! burst by [`Ssd1306::flush`].
//!
//! Bus framing: every I²C write starts with a control byte, `0x00` for a
//! command stream and `0x40` for display RAM data.

use embedded_hal::i2c::I2c;

use super::font::{self, GLYPH_WIDTH};

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
pub const PAGES: usize = HEIGHT / 8;
const BUF_LEN: usize = WIDTH * PAGES;

/// Glyph plus one blank column.
pub const CHAR_ADVANCE: usize = GLYPH_WIDTH + 1;
pub const COLUMNS: usize = WIDTH / CHAR_ADVANCE;

const CTRL_COMMAND: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;
const DATA_CHUNK: usize = 16;

/// Power-on sequence for a 128×64 panel with the internal charge pump.
#[rustfmt::skip]
const INIT_SEQUENCE: &[u8] = &[
    0xAE,       // display off
    0xD5, 0x80, // clock divide / oscillator
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset 0
    0x40,       // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1,       // segment remap
    0xC8,       // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH deselect
    0xA4,       // resume from RAM
    0xA6,       // normal (not inverted)
    0xAF,       // display on
];

pub struct Ssd1306<I2C> {
    i2c: I2C,
    addr: u8,
    buf: [u8; BUF_LEN],
}

impl<I2C: I2c> Ssd1306<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            buf: [0; BUF_LEN],
        }
    }

    /// Send the power-on sequence and blank the panel.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.command(INIT_SEQUENCE)?;
        self.clear();
        self.flush()
    }

    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Draw `text` on `page` (0–7) starting at character column `col`.
    /// Text past the right edge is clipped.  Returns characters drawn.
    pub fn draw_text(&mut self, page: usize, col: usize, text: &str) -> usize {
        if page >= PAGES {
            return 0;
        }
        let row = &mut self.buf[page * WIDTH..(page + 1) * WIDTH];
        let mut drawn = 0;
        for (i, c) in text.chars().enumerate() {
            let x = (col + i) * CHAR_ADVANCE;
            if x + GLYPH_WIDTH > WIDTH {
                break;
            }
            row[x..x + GLYPH_WIDTH].copy_from_slice(font::glyph(c));
            row[x + GLYPH_WIDTH..(x + CHAR_ADVANCE).min(WIDTH)].fill(0);
            drawn += 1;
        }
        drawn
    }

    /// Push the whole framebuffer to display RAM.
    pub fn flush(&mut self) -> Result<(), I2C::Error> {
        // Column 0–127, page 0–7: the write pointer wraps through all of RAM.
        self.command(&[0x21, 0, (WIDTH - 1) as u8, 0x22, 0, (PAGES - 1) as u8])?;

        let mut frame = [0u8; DATA_CHUNK + 1];
        frame[0] = CTRL_DATA;
        for chunk in self.buf.chunks(DATA_CHUNK) {
            frame[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.addr, &frame[..=chunk.len()])?;
        }
        Ok(())
    }

    pub fn framebuffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn command(&mut self, cmds: &[u8]) -> Result<(), I2C::Error> {
        let mut frame = [0u8; 32];
        frame[0] = CTRL_COMMAND;
        for chunk in cmds.chunks(frame.len() - 1) {
            frame[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.addr, &frame[..=chunk.len()])?;
        }
        Ok(())
    }
}
