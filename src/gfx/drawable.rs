use super::Rgb;

/// Pixel access shared by framebuffers and the displays that own them.
/// `get_pixel` and `set_pixel` panic outside the grid; coordinates must
/// already be known to fit (see `in_bounds`).
pub trait Drawable {
    fn fill(&mut self, color: Rgb);
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb);

    fn get_pixel(&self, x: u32, y: u32) -> Rgb;

    fn in_bounds(&self, x: u32, y: u32) -> bool;
}
