use super::Framebuffer;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("could not use save file {path:?}: {source}")]
    SaveFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("display {0:?} is closed")]
    Closed(String),
}

/// The hardware (or simulated hardware) behind a display.
pub trait Device {
    /// Called once, before the first refresh.
    fn init(&mut self) -> Result<(), DeviceError>;

    /// Push the whole framebuffer out to the device.
    fn update_display(&mut self, framebuffer: &Framebuffer) -> Result<(), DeviceError>;

    /// Release the device. Called at most once.
    fn close(&mut self);
}
