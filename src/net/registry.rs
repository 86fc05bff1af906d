use super::error::RequestError;
use super::update::{fill_color, PixelUpdate, Query};
use crate::gfx::{Display, Drawable, Rgb};
use log::{debug, info, warn};
use std::fmt::Write;


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How many pixel writes of an update request went through.
pub struct UpdateSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// The displays served by this process, addressed by their position.
///
/// Displays are only ever appended, so an ID stays valid for the life
/// of the registry. The registry is the only writer of their pixels.
#[derive(Default)]
pub struct Registry {
    displays: Vec<Display>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Register a display and return the ID it will be addressed by.
    pub fn add_display(&mut self, display: Display) -> usize {
        self.displays.push(display);
        self.displays.len() - 1
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    // Turn a display ID as received on the wire into an index.
    fn position(&self, token: Option<&str>) -> Result<usize, RequestError> {
        let token = token.ok_or(RequestError::MissingIdentifier)?;
        let id: i64 = token
            .parse()
            .map_err(|_| RequestError::MalformedIdentifier(token.to_string()))?;

        let count = self.displays.len();
        if id < 0 || id >= count as i64 {
            return Err(RequestError::IdentifierOutOfRange { id, count });
        }
        Ok(id as usize)
    }

    pub fn resolve(&self, token: Option<&str>) -> Result<(&Display, usize), RequestError> {
        let id = self.position(token)?;
        Ok((&self.displays[id], id))
    }

    pub fn resolve_mut(
        &mut self,
        token: Option<&str>,
    ) -> Result<(&mut Display, usize), RequestError> {
        let id = self.position(token)?;
        Ok((&mut self.displays[id], id))
    }

    /// A sentence describing one display.
    pub fn describe(&self, token: Option<&str>) -> Result<String, RequestError> {
        let (display, id) = self.resolve(token)?;
        Ok(format!(
            "Display {} is \"{}\" and has size {}x{}",
            id,
            display.name(),
            display.width(),
            display.height()
        ))
    }

    /// `width;height;name` of one display.
    pub fn specs(&self, token: Option<&str>) -> Result<String, RequestError> {
        let (display, _) = self.resolve(token)?;
        Ok(format!(
            "{};{};{}",
            display.width(),
            display.height(),
            display.name()
        ))
    }

    /// One `id;width;height;name` line per display, in ID order.
    pub fn all_specs(&self) -> String {
        let mut out = String::new();
        for (id, display) in self.displays.iter().enumerate() {
            let _ = writeln!(
                out,
                "{};{};{};{}",
                id,
                display.width(),
                display.height(),
                display.name()
            );
        }
        out
    }

    /// The full framebuffer of one display, as `r;g;b;` per pixel.
    pub fn framebuffer(&self, token: Option<&str>) -> Result<String, RequestError> {
        let (display, _) = self.resolve(token)?;
        Ok(display.framebuffer().encode())
    }

    /// Apply the single update in `query` (if any), then every `x;y;r;g;b`
    /// line of `body` in order, then refresh the display once.
    /// Bad updates are logged and skipped.
    pub fn update(
        &mut self,
        token: Option<&str>,
        query: &Query,
        body: &str,
    ) -> Result<UpdateSummary, RequestError> {
        let (display, id) = self.resolve_mut(token)?;
        let (width, height) = (display.width(), display.height());
        let mut summary = UpdateSummary::default();

        if let Some(update) = PixelUpdate::from_query(query, width, height) {
            match update {
                Ok(update) => apply(display, id, update, &mut summary),
                Err(e) => {
                    warn!("Display {id}: skipping query update: {e}");
                    summary.skipped += 1;
                }
            }
        }

        for (number, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match PixelUpdate::from_line(line, width, height) {
                Ok(update) => apply(display, id, update, &mut summary),
                Err(e) => {
                    warn!("Display {id}: skipping body line {}: {e}", number + 1);
                    summary.skipped += 1;
                }
            }
        }

        display.flush()?;
        debug!(
            "Display {id}: {} updates applied, {} skipped",
            summary.applied, summary.skipped
        );
        Ok(summary)
    }

    /// Fill a display with the color given as `r`, `g`, `b` (black when
    /// absent or invalid) and refresh it. Returns the color used.
    pub fn clear(&mut self, token: Option<&str>, query: &Query) -> Result<Rgb, RequestError> {
        let (display, id) = self.resolve_mut(token)?;

        let color = match fill_color(query) {
            None => Rgb::BLACK,
            Some(Ok(color)) => color,
            Some(Err(e)) => {
                warn!("Display {id}: bad fill color ({e}), using black");
                Rgb::BLACK
            }
        };

        display.fill(color);
        display.flush()?;
        info!("{} -> RGB({},{},{})", id, color.r, color.g, color.b);
        Ok(color)
    }

    /// Close every display. Safe to call more than once.
    pub fn close(&mut self) {
        for display in self.displays.iter_mut() {
            display.close();
        }
    }
}

fn apply(display: &mut Display, id: usize, update: PixelUpdate, summary: &mut UpdateSummary) {
    let PixelUpdate { x, y, color } = update;
    display.set_pixel(x, y, color);
    summary.applied += 1;
    debug!(
        "{} ({},{}) -> RGB({},{},{})",
        id, x, y, color.r, color.g, color.b
    );
}
