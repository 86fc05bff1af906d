use super::device::{Device, DeviceError};
use super::{Drawable, Framebuffer, Rgb};
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

// The two bits at the top of every 32-bit word select what it carries.
const COLOR_COMMAND: u32 = 0b00;
const CORRECTION_COMMAND: u32 = 0b01;

/// Factory dot correction for the chain (7 bits per channel).
pub const DEFAULT_CORRECTION: Rgb = Rgb::new(65, 50, 50);

/// A chain of ShiftBrite (A6281) LED modules fed through a byte sink,
/// usually an SPI device node.
///
/// Each refresh is two phases, each followed by a latch (a sink flush):
/// one dot-correction word per light, then one color word per light.
/// Words go out big-endian in the chain's wiring order (see `chain_order`).
pub struct ShiftBrite<W: Write> {
    sink: W,
    correction: Rgb,
}

impl ShiftBrite<File> {
    pub fn open(path: &Path, correction: Rgb) -> Result<ShiftBrite<File>, DeviceError> {
        let sink = OpenOptions::new().write(true).open(path)?;
        debug!("Opened ShiftBrite chain at {:?}", path);
        Ok(ShiftBrite::new(sink, correction))
    }
}

impl<W: Write> ShiftBrite<W> {
    pub fn new(sink: W, correction: Rgb) -> ShiftBrite<W> {
        ShiftBrite { sink, correction }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &W {
        &self.sink
    }

    fn send(&mut self, word: u32) -> Result<(), DeviceError> {
        self.sink.write_all(&word.to_be_bytes())?;
        Ok(())
    }

    fn latch(&mut self) -> Result<(), DeviceError> {
        self.sink.flush()?;
        Ok(())
    }
}

/// The order lights sit in along the chain: starting at the bottom-right
/// pixel, up the rightmost column, then down the column to its left,
/// zigzagging leftwards until every pixel is visited.
pub fn chain_order(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut order = Vec::with_capacity(width as usize * height as usize);
    for (step, col) in (0..width).rev().enumerate() {
        if step % 2 == 0 {
            order.extend((0..height).rev().map(|row| (col, row)));
        } else {
            order.extend((0..height).map(|row| (col, row)));
        }
    }
    order
}

/// Pack one command word: `cmd | blue | red | green`, ten bits per channel.
pub fn command_word(command: u32, red: u32, green: u32, blue: u32) -> u32 {
    (command & 0b11) << 30 | (blue & 0x3FF) << 20 | (red & 0x3FF) << 10 | (green & 0x3FF)
}

// Stretch an 8-bit channel over the 10-bit PWM range (0 -> 0, 255 -> 1023).
fn widen(channel: u8) -> u32 {
    let c = channel as u32;
    c << 2 | c >> 6
}

impl<W: Write> Device for ShiftBrite<W> {
    fn init(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn update_display(&mut self, framebuffer: &Framebuffer) -> Result<(), DeviceError> {
        let lights = framebuffer.width as usize * framebuffer.height as usize;

        let correction = command_word(
            CORRECTION_COMMAND,
            (self.correction.r & 0x7F) as u32,
            (self.correction.g & 0x7F) as u32,
            (self.correction.b & 0x7F) as u32,
        );
        for _ in 0..lights {
            self.send(correction)?;
        }
        self.latch()?;

        for (x, y) in chain_order(framebuffer.width, framebuffer.height) {
            let color = framebuffer.get_pixel(x, y);
            self.send(command_word(
                COLOR_COMMAND,
                widen(color.r),
                widen(color.g),
                widen(color.b),
            ))?;
        }
        self.latch()
    }

    fn close(&mut self) {
        if let Err(e) = self.sink.flush() {
            warn!("Could not flush ShiftBrite chain on close: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn missing_node_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spidev9.9");

        let opened = ShiftBrite::open(&path, DEFAULT_CORRECTION);
        assert!(matches!(opened, Err(DeviceError::Io(_))));
        assert!(!path.exists(), "opening must not create the node");
    }

    #[test]
    fn zigzag_order() {
        assert_eq!(
            chain_order(2, 3),
            vec![(1, 2), (1, 1), (1, 0), (0, 0), (0, 1), (0, 2)]
        );
        assert_eq!(chain_order(7, 8).len(), 56);
    }

    #[test]
    fn word_layout() {
        assert_eq!(command_word(0, 0, 0, 0x3FF), 0x3FF0_0000);
        assert_eq!(command_word(0, 0x3FF, 0, 0), 0x000F_FC00);
        assert_eq!(command_word(0, 0, 0x3FF, 0), 0x0000_03FF);
        assert_eq!(command_word(1, 0, 0, 0), 0x4000_0000);
        assert_eq!(widen(0), 0);
        assert_eq!(widen(255), 0x3FF);
    }

    #[test]
    fn refresh_sends_correction_then_colors() {
        let mut fb = Framebuffer::new(1, 2);
        fb.set_pixel(0, 0, Rgb::new(255, 0, 0));
        fb.set_pixel(0, 1, Rgb::new(0, 0, 255));

        let mut chain = ShiftBrite::new(Vec::new(), DEFAULT_CORRECTION);
        chain.init().unwrap();
        chain.update_display(&fb).unwrap();

        let correction = command_word(1, 65, 50, 50);
        assert_eq!(
            words(chain.sink()),
            vec![
                correction,
                correction,
                // Bottom pixel first.
                command_word(0, 0, 0, 0x3FF),
                command_word(0, 0x3FF, 0, 0),
            ]
        );
    }
}
