use crate::gfx::DeviceError;
use thiserror::Error;

/// Failures that end a whole request. Nothing has been changed
/// when one of these is returned, except for `Device`, which is
/// reported after the framebuffer was already updated.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("display ID not given")]
    MissingIdentifier,

    #[error("display ID {0:?} is not a number")]
    MalformedIdentifier(String),

    #[error("display ID {id} out of range ({count} displays)")]
    IdentifierOutOfRange { id: i64, count: usize },

    #[error("could not refresh display: {0}")]
    Device(#[from] DeviceError),
}

impl RequestError {
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::MissingIdentifier | RequestError::MalformedIdentifier(_) => 400,
            RequestError::IdentifierOutOfRange { .. } => 404,
            RequestError::Device(_) => 500,
        }
    }
}

/// Failures of a single pixel update. These are logged and skipped;
/// the rest of the request carries on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("coordinate ({x},{y}) out of range for a {width}x{height} display")]
    CoordinateOutOfRange {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("channel {channel}={value} out of range 0..=255")]
    ChannelOutOfRange { channel: &'static str, value: i64 },

    #[error("malformed input - {0:?}")]
    MalformedBatchLine(String),

    #[error("parameter {name}={value:?} is not an integer")]
    MalformedParameter { name: &'static str, value: String },

    #[error("parameter {0} is missing")]
    MissingParameter(&'static str),
}
