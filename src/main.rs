mod config;
mod error;
pub mod gfx;
pub mod net;

use clap::{Parser, ValueEnum};
use config::{Config, ConfigError, DeviceConfig, DisplayConfig};
use error::Error;
use gfx::{DeviceError, Display, DEFAULT_CORRECTION};
use log::{error, info, warn};
use net::{Listener, Registry, Router, DEFAULT_BASE};
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
enum DeviceKind {
    /// No hardware; refreshes are only logged
    Headless,
    /// A ShiftBrite LED chain behind an SPI device node
    Shiftbrite,
    /// An SDL window
    #[cfg(feature = "window")]
    Window,
}

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Image file to restore the display from, rewritten on every refresh
    #[arg(conflicts_with = "config")]
    save_file: Option<PathBuf>,

    /// JSON file listing the displays to serve (replaces the single-display options)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the display
    #[arg(long, default_value = "Hive13 ShiftBrite")]
    name: String,

    /// Width of the display in pixels
    #[arg(long, default_value_t = 7)]
    width: u32,

    /// Height of the display in pixels
    #[arg(long, default_value_t = 8)]
    height: u32,

    /// What the display is attached to
    #[arg(long, value_enum, default_value_t = DeviceKind::Headless)]
    device: DeviceKind,

    /// Device node of the ShiftBrite chain
    #[arg(long, default_value = "/dev/spidev0.0")]
    spi_path: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Path prefix of every resource
    #[arg(long, default_value = DEFAULT_BASE)]
    base_url: String,

    /// Whether or not to turn on debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn config(&self) -> Result<Config, ConfigError> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config {
                displays: vec![DisplayConfig {
                    name: self.name.clone(),
                    width: self.width,
                    height: self.height,
                    device: self.device_config(),
                    save_file: self.save_file.clone(),
                }],
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn device_config(&self) -> DeviceConfig {
        match self.device {
            DeviceKind::Headless => DeviceConfig::Headless,
            DeviceKind::Shiftbrite => DeviceConfig::Shiftbrite {
                path: self.spi_path.clone(),
                dot_correction: DEFAULT_CORRECTION,
            },
            #[cfg(feature = "window")]
            DeviceKind::Window => DeviceConfig::Window {
                scale: config::default_scale(),
            },
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

// Register each display as it comes up, in order. Stops at the first failure,
// leaving the displays opened so far in the registry.
fn open_displays<I>(displays: I, registry: &mut Registry) -> Result<(), Error>
where
    I: IntoIterator<Item = (String, Result<Display, DeviceError>)>,
{
    for (name, built) in displays {
        let display = built.map_err(|source| Error::Display {
            name: name.clone(),
            source,
        })?;
        let id = registry.add_display(display);
        info!("Serving {:?} as display {}", name, id);
    }
    Ok(())
}

/// Bring up the displays, then the listener. If anything fails, every
/// display opened so far is closed before the error is returned.
fn start<I>(displays: I, addr: &str) -> Result<(Registry, Listener), Error>
where
    I: IntoIterator<Item = (String, Result<Display, DeviceError>)>,
{
    let mut registry = Registry::new();
    let started =
        open_displays(displays, &mut registry).and_then(|()| Ok(Listener::bind(addr)?));

    match started {
        Ok(listener) => Ok((registry, listener)),
        Err(e) => {
            error!("{e}");
            error!("Trying to fail gracefully...");
            registry.close();
            Err(e)
        }
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = args.config().inspect_err(|e| error!("{e}"))?;

    let addr = format!("{}:{}", args.host, args.port);
    // Lazy: a display is only built once the ones before it are up.
    let displays = config
        .displays
        .iter()
        .map(|entry| (entry.name.clone(), entry.build()));
    let (mut registry, listener) = start(displays, &addr)?;

    if let Err(e) = ctrlc::set_handler(listener.shutdown_handle()) {
        warn!("Could not install the signal handler: {e}");
    }

    let mut router = Router::new(&args.base_url, &mut registry);
    listener.serve(&mut router);

    info!("Shutting down safely...");
    registry.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfx::MockDevice;
    use std::fs;

    #[test]
    fn failed_display_closes_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let save = dir.path().join("corrupt.json");
        fs::write(&save, "not json").unwrap();

        let (device, log) = MockDevice::new();
        let first = Display::new("First", 2, 2, Box::new(device));
        let second = DisplayConfig {
            name: "Second".to_string(),
            width: 2,
            height: 2,
            device: DeviceConfig::Headless,
            save_file: Some(save),
        };

        let displays = vec![
            ("First".to_string(), first),
            ("Second".to_string(), second.build()),
        ];
        let started = start(displays, "127.0.0.1:0");

        assert!(matches!(started, Err(Error::Display { ref name, .. }) if name == "Second"));
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn failed_bind_closes_displays() {
        let (device, log) = MockDevice::new();
        let displays = vec![(
            "Only".to_string(),
            Display::new("Only", 1, 1, Box::new(device)),
        )];

        // Port out of range, so the address never resolves.
        let started = start(displays, "127.0.0.1:99999");

        assert!(matches!(started, Err(Error::Bind(_))));
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn started_displays_stay_open() {
        let (device, log) = MockDevice::new();
        let displays = vec![(
            "Only".to_string(),
            Display::new("Only", 1, 1, Box::new(device)),
        )];

        let (mut registry, _listener) = start(displays, "127.0.0.1:0").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(log.borrow().closes, 0);

        registry.close();
        assert_eq!(log.borrow().closes, 1);
    }
}
