use crate::config::ConfigError;
use crate::gfx::DeviceError;
use crate::net::BindError;
use thiserror::Error;

/// Anything that stops the service from starting.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not start display {name:?}: {source}")]
    Display { name: String, source: DeviceError },

    #[error(transparent)]
    Bind(#[from] BindError),
}
