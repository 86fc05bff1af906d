use super::device::{Device, DeviceError};
use super::Framebuffer;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
/// What a MockDevice has been asked to do so far.
pub struct MockLog {
    pub inits: usize,
    pub refreshes: usize,
    pub closes: usize,
    pub last_frame: Option<Framebuffer>,
    // When set, init fails.
    pub fail_init: bool,
    // When set, every refresh fails.
    pub fail_refresh: bool,
}

/// A stand-in for real hardware during testing. The test keeps a handle
/// to the shared log while the display owns the device.
pub struct MockDevice {
    log: Rc<RefCell<MockLog>>,
}

impl MockDevice {
    pub fn new() -> (MockDevice, Rc<RefCell<MockLog>>) {
        let log = Rc::new(RefCell::new(MockLog::default()));
        (MockDevice { log: Rc::clone(&log) }, log)
    }
}

impl Device for MockDevice {
    fn init(&mut self) -> Result<(), DeviceError> {
        let mut log = self.log.borrow_mut();
        log.inits += 1;
        if log.fail_init {
            return Err(DeviceError::Io(std::io::Error::other("mock init failure")));
        }
        Ok(())
    }

    fn update_display(&mut self, framebuffer: &Framebuffer) -> Result<(), DeviceError> {
        let mut log = self.log.borrow_mut();
        if log.fail_refresh {
            return Err(DeviceError::Io(std::io::Error::other("mock refresh failure")));
        }
        log.refreshes += 1;
        log.last_frame = Some(framebuffer.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.log.borrow_mut().closes += 1;
    }
}
