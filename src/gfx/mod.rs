mod color;
mod device;
mod display;
mod drawable;
mod framebuffer;
mod headless;
#[cfg(test)]
mod mockdevice;
mod shiftbrite;
#[cfg(feature = "window")]
mod window;

pub use color::Rgb;
pub use device::{Device, DeviceError};
pub use display::Display;
pub use drawable::Drawable;
pub use framebuffer::Framebuffer;
pub use headless::Headless;
#[cfg(test)]
pub use mockdevice::{MockDevice, MockLog};
pub use shiftbrite::{ShiftBrite, DEFAULT_CORRECTION};
#[cfg(feature = "window")]
pub use window::Window;
