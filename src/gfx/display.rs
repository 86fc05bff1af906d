use super::device::{Device, DeviceError};
use super::{Drawable, Framebuffer, Rgb};
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A named pixel grid and the device it is mirrored to.
///
/// Pixel writes only touch the in-memory framebuffer; nothing reaches
/// the device (or the save file) until `flush`.
pub struct Display {
    name: String,
    screen: Framebuffer,
    device: Box<dyn Device>,
    save_file: Option<PathBuf>,
    closed: bool,
}

impl Display {
    pub fn new(
        name: &str,
        width: u32,
        height: u32,
        mut device: Box<dyn Device>,
    ) -> Result<Display, DeviceError> {
        if let Err(e) = device.init() {
            device.close();
            return Err(e);
        }
        info!("Display {name:?} is up ({width}x{height})");

        Ok(Display {
            name: name.to_string(),
            screen: Framebuffer::new(width, height),
            device,
            save_file: None,
            closed: false,
        })
    }

    /// Mirror the framebuffer to `path` on every flush. If the file already
    /// holds an image of the same size, it becomes the current contents.
    pub fn set_save_file(&mut self, path: &Path) -> Result<(), DeviceError> {
        info!("{}: trying to use saved image in {:?}", self.name, path);

        match fs::read_to_string(path) {
            Ok(text) => {
                let saved: Framebuffer =
                    serde_json::from_str(&text).map_err(|source| DeviceError::SaveFile {
                        path: path.to_path_buf(),
                        source,
                    })?;

                if saved.is_consistent()
                    && saved.width == self.screen.width
                    && saved.height == self.screen.height
                {
                    self.screen = saved;
                    info!("{}: restored saved image", self.name);
                } else {
                    warn!(
                        "{}: saved image is {} but the display is {}, not restoring it",
                        self.name, saved, self.screen
                    );
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{}: {:?} does not exist yet", self.name, path);
            }
            Err(e) => return Err(e.into()),
        }

        self.save_file = Some(path.to_path_buf());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.screen.width
    }

    pub fn height(&self) -> u32 {
        self.screen.height
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.screen
    }

    /// Push the framebuffer to the device, then to the save file if any.
    pub fn flush(&mut self) -> Result<(), DeviceError> {
        if self.closed {
            return Err(DeviceError::Closed(self.name.clone()));
        }

        self.device.update_display(&self.screen)?;

        if let Some(path) = &self.save_file {
            let json = serde_json::to_string(&self.screen).map_err(|source| {
                DeviceError::SaveFile {
                    path: path.clone(),
                    source,
                }
            })?;
            fs::write(path, json)?;
        }
        Ok(())
    }

    /// Release the device. Later calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.device.close();
        info!("Display {:?} closed", self.name);
    }
}

impl Drawable for Display {
    fn fill(&mut self, color: Rgb) {
        self.screen.fill(color);
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        self.screen.set_pixel(x, y, color);
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        self.screen.get_pixel(x, y)
    }

    fn in_bounds(&self, x: u32, y: u32) -> bool {
        self.screen.in_bounds(x, y)
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::MockDevice;

    #[test]
    fn lifecycle() {
        let (device, log) = MockDevice::new();
        let mut display = Display::new("Test", 2, 2, Box::new(device)).unwrap();
        assert_eq!(log.borrow().inits, 1);

        display.set_pixel(1, 1, Rgb::new(1, 2, 3));
        assert_eq!(log.borrow().refreshes, 0, "writes must not reach the device");

        display.flush().unwrap();
        display.flush().unwrap();
        assert_eq!(log.borrow().refreshes, 2);
        let frame = log.borrow().last_frame.clone().unwrap();
        assert_eq!(frame.get_pixel(1, 1), Rgb::new(1, 2, 3));

        display.close();
        display.close();
        assert_eq!(log.borrow().closes, 1);
        assert!(matches!(display.flush(), Err(DeviceError::Closed(_))));

        drop(display);
        assert_eq!(log.borrow().closes, 1, "drop after close must not close again");
    }

    #[test]
    fn failed_init_closes_device() {
        let (device, log) = MockDevice::new();
        log.borrow_mut().fail_init = true;

        assert!(Display::new("Dead", 1, 1, Box::new(device)).is_err());
        assert_eq!(log.borrow().inits, 1);
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn drop_closes() {
        let (device, log) = MockDevice::new();
        let display = Display::new("Test", 1, 1, Box::new(device)).unwrap();
        drop(display);
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn save_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.json");

        let (device, _log) = MockDevice::new();
        let mut display = Display::new("Saved", 3, 2, Box::new(device)).unwrap();
        display.set_save_file(&path).unwrap();
        assert!(!path.exists(), "nothing is written before the first flush");

        display.set_pixel(2, 1, Rgb::new(40, 50, 60));
        display.flush().unwrap();
        assert!(path.exists());

        let (device, _log) = MockDevice::new();
        let mut restored = Display::new("Saved", 3, 2, Box::new(device)).unwrap();
        restored.set_save_file(&path).unwrap();
        assert_eq!(restored.get_pixel(2, 1), Rgb::new(40, 50, 60));
        assert_eq!(restored.framebuffer(), display.framebuffer());
    }

    #[test]
    fn save_file_of_other_size_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.json");

        let mut other = Framebuffer::new(4, 4);
        other.fill(Rgb::new(9, 9, 9));
        fs::write(&path, serde_json::to_string(&other).unwrap()).unwrap();

        let (device, _log) = MockDevice::new();
        let mut display = Display::new("Small", 2, 2, Box::new(device)).unwrap();
        display.set_save_file(&path).unwrap();
        assert_eq!(display.get_pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn corrupt_save_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.json");
        fs::write(&path, "not json").unwrap();

        let (device, _log) = MockDevice::new();
        let mut display = Display::new("Broken", 2, 2, Box::new(device)).unwrap();
        assert!(matches!(
            display.set_save_file(&path),
            Err(DeviceError::SaveFile { .. })
        ));
    }
}
