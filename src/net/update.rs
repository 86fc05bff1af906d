use super::error::UpdateError;
use crate::gfx::Rgb;
use std::collections::HashMap;

/// Decoded query-string parameters.
pub type Query = HashMap<String, String>;

// Parameter names of a single update, in body-line field order.
const FIELDS: [&str; 5] = ["x", "y", "r", "g", "b"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// One validated pixel write, known to fit the target display.
pub struct PixelUpdate {
    pub x: u32,
    pub y: u32,
    pub color: Rgb,
}

impl PixelUpdate {
    /// Validate raw `[x, y, r, g, b]` values against a display's geometry.
    pub fn new(fields: [i64; 5], width: u32, height: u32) -> Result<PixelUpdate, UpdateError> {
        let [x, y, r, g, b] = fields;

        if x < 0 || x >= width as i64 || y < 0 || y >= height as i64 {
            return Err(UpdateError::CoordinateOutOfRange {
                x,
                y,
                width,
                height,
            });
        }

        Ok(PixelUpdate {
            x: x as u32,
            y: y as u32,
            color: Rgb::new(channel("r", r)?, channel("g", g)?, channel("b", b)?),
        })
    }

    /// The single update carried in the query string, if the request has one.
    /// Giving only some of `x`, `y`, `r`, `g`, `b` is an error.
    pub fn from_query(
        query: &Query,
        width: u32,
        height: u32,
    ) -> Option<Result<PixelUpdate, UpdateError>> {
        if !FIELDS.iter().any(|name| query.contains_key(*name)) {
            return None;
        }

        let mut fields = [0i64; 5];
        for (slot, name) in fields.iter_mut().zip(FIELDS) {
            match parameter(query, name) {
                Ok(value) => *slot = value,
                Err(e) => return Some(Err(e)),
            }
        }
        Some(PixelUpdate::new(fields, width, height))
    }

    /// Parse one body line of the form `x;y;r;g;b`.
    pub fn from_line(line: &str, width: u32, height: u32) -> Result<PixelUpdate, UpdateError> {
        let malformed = || UpdateError::MalformedBatchLine(line.to_string());

        let parts: Vec<&str> = line.split(';').collect();
        if parts.len() != FIELDS.len() {
            return Err(malformed());
        }

        let mut fields = [0i64; 5];
        for (slot, part) in fields.iter_mut().zip(parts) {
            *slot = part.trim().parse().map_err(|_| malformed())?;
        }
        PixelUpdate::new(fields, width, height)
    }
}

/// The fill color of a clear request: `None` unless all of `r`, `g`
/// and `b` are given.
pub fn fill_color(query: &Query) -> Option<Result<Rgb, UpdateError>> {
    if !["r", "g", "b"].iter().all(|name| query.contains_key(*name)) {
        return None;
    }

    Some(color(query))
}

fn color(query: &Query) -> Result<Rgb, UpdateError> {
    Ok(Rgb::new(
        channel("r", parameter(query, "r")?)?,
        channel("g", parameter(query, "g")?)?,
        channel("b", parameter(query, "b")?)?,
    ))
}

fn parameter(query: &Query, name: &'static str) -> Result<i64, UpdateError> {
    let value = query
        .get(name)
        .ok_or(UpdateError::MissingParameter(name))?;

    value
        .trim()
        .parse()
        .map_err(|_| UpdateError::MalformedParameter {
            name,
            value: value.clone(),
        })
}

fn channel(channel: &'static str, value: i64) -> Result<u8, UpdateError> {
    u8::try_from(value).map_err(|_| UpdateError::ChannelOutOfRange { channel, value })
}
