use super::{Drawable, Rgb};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::fmt;
use std::fmt::Write;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// The in-memory pixels of a display.
/// Pixels are stored row-major: the pixel at (x, y)
/// lives at index `y * width + x`.
pub struct Framebuffer {
    // Number of columns.
    pub width: u32,
    // Number of rows.
    pub height: u32,
    // Saved as "r;g;b" strings so save files stay readable.
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pixels: Vec<Rgb>,
}

/// Iterator over every pixel of a Framebuffer,
/// scanline by scanline, yielding `(x, y, color)`.
pub struct Pixels<'a> {
    framebuffer: &'a Framebuffer,
    index: usize,
}

impl Iterator for Pixels<'_> {
    type Item = (u32, u32, Rgb);

    fn next(&mut self) -> Option<Self::Item> {
        let color = *self.framebuffer.pixels.get(self.index)?;
        let width = self.framebuffer.width as usize;
        let item = (
            (self.index % width) as u32,
            (self.index / width) as u32,
            color,
        );

        self.index += 1;
        Some(item)
    }
}

impl<'a> IntoIterator for &'a Framebuffer {
    type Item = (u32, u32, Rgb);
    type IntoIter = Pixels<'a>;

    fn into_iter(self) -> Pixels<'a> {
        Pixels {
            framebuffer: self,
            index: 0,
        }
    }
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Framebuffer {
        if width == 0 || height == 0 {
            panic!("Zero framebuffer size provided: w{width} h{height}");
        }

        Framebuffer {
            width,
            height,
            pixels: vec![Rgb::BLACK; width as usize * height as usize],
        }
    }

    /// True when the pixel count agrees with the stated geometry.
    /// Deserialized framebuffers must be checked before use.
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == self.width as usize * self.height as usize
    }

    /// Serialize for the wire: `r;g;b;` once per pixel, row-major,
    /// with no row delimiter.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.pixels.len() * 12);
        for (_, _, pixel) in self {
            // Writing into a String cannot fail.
            let _ = write!(out, "{pixel};");
        }
        out
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Drawable for Framebuffer {
    // Setters.
    fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    // Getters.
    fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    // Info.
    fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

// Mostly useful for logging.
impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{} ({} pixels)", self.width, self.height, self.pixels.len())
    }
}
