use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// A single 24-bit pixel value.
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected three ';'-separated channels in 0..=255, got {0:?}")]
pub struct ParseRgbError(pub String);

// Written as `r;g;b`, the same shape the wire format and save files use.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{};{};{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Rgb, ParseRgbError> {
        let err = || ParseRgbError(s.to_string());

        let mut channels = s.split(';').map(|c| c.trim().parse::<u8>());
        match (channels.next(), channels.next(), channels.next(), channels.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Ok(Rgb { r, g, b }),
            _ => Err(err()),
        }
    }
}
