use crate::gfx::{Device, DeviceError, Display, Headless, Rgb, ShiftBrite, DEFAULT_CORRECTION};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no displays configured")]
    NoDisplays,

    #[error("display {name:?} has no pixels ({width}x{height})")]
    ZeroSize {
        name: String,
        width: u32,
        height: u32,
    },

    #[error("display {name:?}: dot correction {correction} is above 127")]
    Correction { name: String, correction: Rgb },
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
/// The displays to serve, in ID order.
pub struct Config {
    pub displays: Vec<DisplayConfig>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub save_file: Option<PathBuf>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceConfig {
    #[default]
    Headless,
    Shiftbrite {
        path: PathBuf,
        // Written like a color: "r;g;b".
        #[serde_as(as = "DisplayFromStr")]
        #[serde(default = "default_correction")]
        dot_correction: Rgb,
    },
    #[cfg(feature = "window")]
    Window {
        #[serde(default = "default_scale")]
        scale: u32,
    },
}

fn default_correction() -> Rgb {
    DEFAULT_CORRECTION
}

#[cfg(feature = "window")]
pub fn default_scale() -> u32 {
    40
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.displays.is_empty() {
            return Err(ConfigError::NoDisplays);
        }

        for display in &self.displays {
            if display.width == 0 || display.height == 0 {
                return Err(ConfigError::ZeroSize {
                    name: display.name.clone(),
                    width: display.width,
                    height: display.height,
                });
            }

            if let DeviceConfig::Shiftbrite { dot_correction, .. } = &display.device {
                let c = dot_correction;
                if c.r > 127 || c.g > 127 || c.b > 127 {
                    return Err(ConfigError::Correction {
                        name: display.name.clone(),
                        correction: *c,
                    });
                }
            }
        }
        Ok(())
    }
}

impl DeviceConfig {
    pub fn open(&self, display: &DisplayConfig) -> Result<Box<dyn Device>, DeviceError> {
        let device: Box<dyn Device> = match self {
            DeviceConfig::Headless => Box::new(Headless::new(&display.name)),
            DeviceConfig::Shiftbrite {
                path,
                dot_correction,
            } => Box::new(ShiftBrite::open(path, *dot_correction)?),
            #[cfg(feature = "window")]
            DeviceConfig::Window { scale } => Box::new(crate::gfx::Window::new(
                &display.name,
                display.width,
                display.height,
                *scale,
            )),
        };
        Ok(device)
    }
}

impl DisplayConfig {
    /// Open the device and bring the display up, restoring the save file
    /// if one is configured.
    pub fn build(&self) -> Result<Display, DeviceError> {
        let device = self.device.open(self)?;
        let mut display = Display::new(&self.name, self.width, self.height, device)?;

        if let Some(path) = &self.save_file {
            display.set_save_file(path)?;
        }
        Ok(display)
    }
}
