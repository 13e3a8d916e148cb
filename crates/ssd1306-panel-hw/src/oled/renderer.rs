//! Glyph and region drawing with a text cursor.

use super::font::Font;
use super::framebuffer::{Framebuffer, Geometry};

/// Text cursor in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

impl Cursor {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Draws into a framebuffer and tracks where the next glyph goes.
///
/// The cursor only moves right. Starting a new line is up to the caller.
#[derive(Debug, Clone)]
pub struct Renderer {
    framebuffer: Framebuffer,
    cursor: Cursor,
    font: &'static Font,
}

impl Renderer {
    /// Creates a renderer over a blank framebuffer with the cursor at the origin.
    pub fn new(geometry: Geometry, font: &'static Font) -> Self {
        Self {
            framebuffer: Framebuffer::with_geometry(geometry),
            cursor: Cursor::default(),
            font,
        }
    }

    /// Returns the framebuffer being drawn into.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Returns where the next glyph goes.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Moves the cursor. Positions off screen are ignored.
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        if x >= self.framebuffer.width() || y >= self.framebuffer.height() {
            return;
        }
        self.cursor = Cursor::new(x, y);
    }

    /// Draws one character at the cursor and advances it by the glyph width.
    ///
    /// The glyph is dropped, and the cursor left alone, when its right or
    /// bottom edge would reach the screen edge. A glyph that would sit exactly
    /// flush against the edge is dropped too. Codes without a glyph are
    /// dropped the same way.
    pub fn write_char(&mut self, code: u8) {
        let width = self.font.width() as u16;
        let height = self.font.height() as u16;
        let Cursor { x, y } = self.cursor;

        if x as u32 + width as u32 >= self.framebuffer.width() as u32
            || y as u32 + height as u32 >= self.framebuffer.height() as u32
        {
            return;
        }
        let Some(glyph) = self.font.glyph(code) else {
            return;
        };

        for (col, &bits) in glyph.iter().enumerate() {
            for row in 0..height {
                let on = bits & (1 << row) != 0;
                self.framebuffer.set_pixel(x + col as u16, y + row, on);
            }
        }
        self.cursor.x += width;
    }

    /// Draws bytes up to the first NUL or the end of the slice.
    ///
    /// Does not wrap: once the line is full the remaining glyphs are dropped.
    pub fn write_str(&mut self, text: &[u8]) {
        for &code in text.iter().take_while(|&&c| c != 0) {
            self.write_char(code);
        }
    }

    /// Sets one pixel; off-screen coordinates are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, on: bool) {
        self.framebuffer.set_pixel(x, y, on);
    }

    /// Blanks the framebuffer. The cursor stays put.
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    /// Fills a rectangle, or does nothing if any of it is off screen.
    pub fn fill_region(&mut self, x: u16, y: u16, width: u16, height: u16, on: bool) {
        self.framebuffer.fill_region(x, y, width, height, on);
    }

    /// Inverts a rectangle, or does nothing if any of it is off screen.
    pub fn invert_region(&mut self, x: u16, y: u16, width: u16, height: u16) {
        self.framebuffer.invert_region(x, y, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oled::font::FONT_6X8;

    fn renderer() -> Renderer {
        Renderer::new(Geometry::default(), &FONT_6X8)
    }

    #[test]
    fn test_write_char_draws_glyph_columns() {
        let mut r = renderer();
        r.set_cursor(0, 16);
        r.write_char(b'A');

        let page = r.framebuffer().page(2).unwrap();
        assert_eq!(&page[..6], &[0x7C, 0x12, 0x11, 0x12, 0x7C, 0x00]);
        assert_eq!(r.cursor(), Cursor::new(6, 16));
    }

    #[test]
    fn test_write_char_unaligned_row() {
        let mut r = renderer();
        r.set_cursor(0, 4);
        r.write_char(b'|');

        // '|' is 0x77 in column 2, shifted down four rows.
        assert_eq!(r.framebuffer().data()[2], 0x70);
        assert_eq!(r.framebuffer().data()[2 + 128], 0x07);
    }

    #[test]
    fn test_write_char_overwrites_background() {
        let mut r = renderer();
        r.fill_region(0, 0, 6, 8, true);
        r.write_char(b' ');
        assert!(r.framebuffer().page(0).unwrap()[..6].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_glyph_reaching_right_edge_is_dropped() {
        let mut r = renderer();
        r.set_cursor(123, 16);
        let before = r.framebuffer().clone();
        r.write_char(b'X');
        assert_eq!(r.framebuffer(), &before);
        assert_eq!(r.cursor(), Cursor::new(123, 16));

        // 122 + 6 == 128 lands flush with the edge and is still dropped.
        r.set_cursor(122, 16);
        r.write_char(b'X');
        assert_eq!(r.framebuffer(), &before);
        assert_eq!(r.cursor(), Cursor::new(122, 16));

        r.set_cursor(121, 16);
        r.write_char(b'X');
        assert_ne!(r.framebuffer(), &before);
        assert_eq!(r.cursor(), Cursor::new(127, 16));
    }

    #[test]
    fn test_glyph_reaching_bottom_edge_is_dropped() {
        let mut r = renderer();
        r.set_cursor(0, 56);
        r.write_char(b'X');
        assert!(r.framebuffer().data().iter().all(|&b| b == 0));
        assert_eq!(r.cursor(), Cursor::new(0, 56));

        r.set_cursor(0, 55);
        r.write_char(b'X');
        assert_eq!(r.cursor(), Cursor::new(6, 55));
    }

    #[test]
    fn test_unprintable_codes_are_rejected() {
        let mut r = renderer();
        for code in [0x00, 0x0A, 0x1F, 0x7F, 0x80, 0xFF] {
            r.write_char(code);
        }
        assert!(r.framebuffer().data().iter().all(|&b| b == 0));
        assert_eq!(r.cursor(), Cursor::default());
    }

    #[test]
    fn test_write_str_stops_at_nul_and_never_wraps() {
        let mut r = renderer();
        r.write_str(b"ab\0cd");
        assert_eq!(r.cursor(), Cursor::new(12, 0));

        let long = [b'x'; 40];
        r.write_str(&long);
        // The last glyph that fits starts at 120; the rest vanish.
        assert_eq!(r.cursor(), Cursor::new(126, 0));
    }

    #[test]
    fn test_set_cursor_ignores_off_screen() {
        let mut r = renderer();
        r.set_cursor(10, 16);
        r.set_cursor(128, 0);
        r.set_cursor(0, 64);
        assert_eq!(r.cursor(), Cursor::new(10, 16));
    }
}
