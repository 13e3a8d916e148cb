//! Page-packed monochrome framebuffer.
//!
//! The buffer mirrors SSD1306 GDDRAM: `height / 8` pages of `width` bytes.
//! The byte at `x + page * width` holds eight vertically stacked pixels and
//! bit `k` of it is pixel row `page * 8 + k`.

use crate::{Error, Result, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Rows per GDDRAM page.
pub const PAGE_HEIGHT: u16 = 8;

/// Validated panel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: u16,
    height: u16,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
        }
    }
}

impl Geometry {
    /// Creates a geometry the controller can address.
    ///
    /// Width must be `1..=128`; height a multiple of 8 within the
    /// multiplex range `16..=64`.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let width_ok = (1..=MAX_WIDTH).contains(&width);
        let height_ok = (MIN_HEIGHT..=MAX_HEIGHT).contains(&height) && height % PAGE_HEIGHT == 0;
        if !width_ok || !height_ok {
            return Err(Error::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages.
    pub fn pages(&self) -> u16 {
        self.height / PAGE_HEIGHT
    }

    /// Framebuffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.width as usize * self.pages() as usize
    }

    /// Returns true if the rectangle lies entirely on screen.
    pub fn contains_region(&self, x: u16, y: u16, width: u16, height: u16) -> bool {
        x < self.width
            && y < self.height
            && x as u32 + width as u32 <= self.width as u32
            && y as u32 + height as u32 <= self.height as u32
    }
}

/// Monochrome framebuffer organised in pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    /// One byte per column per page.
    data: Vec<u8>,
    geometry: Geometry,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Creates a blank 128x64 framebuffer.
    pub fn new() -> Self {
        Self::with_geometry(Geometry::default())
    }

    /// Creates a blank framebuffer for the given panel.
    pub fn with_geometry(geometry: Geometry) -> Self {
        Self {
            data: vec![0; geometry.buffer_size()],
            geometry,
        }
    }

    /// Returns the panel geometry.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Returns the width of the framebuffer.
    pub fn width(&self) -> u16 {
        self.geometry.width
    }

    /// Returns the height of the framebuffer.
    pub fn height(&self) -> u16 {
        self.geometry.height
    }

    /// Returns the raw page data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the `width` bytes of one page, or `None` past the last page.
    pub fn page(&self, page: u16) -> Option<&[u8]> {
        let width = self.geometry.width as usize;
        let start = page as usize * width;
        self.data.get(start..start + width)
    }

    /// Iterates over pages top to bottom.
    pub fn pages(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.geometry.width as usize)
    }

    /// Blanks every pixel.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    fn index(&self, x: u16, y: u16) -> Option<(usize, u8)> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let idx = x as usize + (y / PAGE_HEIGHT) as usize * self.geometry.width as usize;
        Some((idx, 1 << (y % PAGE_HEIGHT)))
    }

    /// Sets a pixel. Coordinates off screen are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, on: bool) {
        if let Some((idx, mask)) = self.index(x, y) {
            if on {
                self.data[idx] |= mask;
            } else {
                self.data[idx] &= !mask;
            }
        }
    }

    /// Gets a pixel at the given coordinates.
    pub fn get_pixel(&self, x: u16, y: u16) -> Option<bool> {
        self.index(x, y).map(|(idx, mask)| self.data[idx] & mask != 0)
    }

    /// Sets every pixel of a rectangle.
    ///
    /// Nothing is drawn unless the whole rectangle is on screen.
    pub fn fill_region(&mut self, x: u16, y: u16, width: u16, height: u16, on: bool) {
        if !self.geometry.contains_region(x, y, width, height) {
            return;
        }
        for col in x..x + width {
            for row in y..y + height {
                self.set_pixel(col, row, on);
            }
        }
    }

    /// Flips every pixel of a rectangle, one pixel at a time so regions that
    /// straddle page boundaries are handled exactly.
    ///
    /// Nothing is changed unless the whole rectangle is on screen.
    pub fn invert_region(&mut self, x: u16, y: u16, width: u16, height: u16) {
        if !self.geometry.contains_region(x, y, width, height) {
            return;
        }
        for col in x..x + width {
            for row in y..y + height {
                let lit = self.get_pixel(col, row).unwrap_or(false);
                self.set_pixel(col, row, !lit);
            }
        }
    }

    /// Replaces the contents with raw page data.
    pub fn copy_from_pages(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.data.len() {
            return Err(Error::FramebufferSize {
                expected: self.data.len(),
                actual: data.len(),
            });
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    /// Converts the framebuffer to row-major RGBA8 bytes for PNG encoding.
    ///
    /// Lit pixels become white, dark pixels black.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let (width, height) = (self.geometry.width, self.geometry.height);
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let level = if self.get_pixel(x, y).unwrap_or(false) {
                    0xFF
                } else {
                    0x00
                };
                rgba.extend_from_slice(&[level, level, level, 0xFF]);
            }
        }
        rgba
    }
}
