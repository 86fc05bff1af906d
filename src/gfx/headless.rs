use super::device::{Device, DeviceError};
use super::Framebuffer;
use log::debug;

/// A device with no hardware behind it. Refreshes are only logged,
/// which is enough when the framebuffer itself is the product
/// (for example with a save file attached).
pub struct Headless {
    label: String,
    refreshes: u64,
}

impl Headless {
    pub fn new(label: &str) -> Headless {
        Headless {
            label: label.to_string(),
            refreshes: 0,
        }
    }
}

impl Device for Headless {
    fn init(&mut self) -> Result<(), DeviceError> {
        debug!("{}: headless output ready", self.label);
        Ok(())
    }

    fn update_display(&mut self, framebuffer: &Framebuffer) -> Result<(), DeviceError> {
        self.refreshes += 1;
        debug!(
            "{}: refresh #{} of {}",
            self.label, self.refreshes, framebuffer
        );
        Ok(())
    }

    fn close(&mut self) {
        debug!("{}: closed after {} refreshes", self.label, self.refreshes);
    }
}
