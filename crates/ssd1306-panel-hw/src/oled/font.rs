//! Fixed-size monochrome fonts.
//!
//! Glyphs are stored column-major, one byte per column, with bit `k` holding
//! row `k`. This matches the SSD1306 page layout, so a glyph column can be
//! read straight into a framebuffer column.

/// First character code with a glyph.
pub const FIRST_PRINTABLE: u8 = 0x20;

/// Last character code with a glyph.
pub const LAST_PRINTABLE: u8 = 0x7E;

/// Number of glyphs in a printable-ASCII font.
pub const PRINTABLE_COUNT: usize = (LAST_PRINTABLE - FIRST_PRINTABLE) as usize + 1;

/// Immutable glyph table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Font {
    width: u8,
    height: u8,
    glyphs: &'static [u8],
}

impl Font {
    /// Creates a font over a glyph table of `width * PRINTABLE_COUNT` bytes.
    ///
    /// Heights above 8 are not representable with one byte per column.
    pub const fn new(width: u8, height: u8, glyphs: &'static [u8]) -> Self {
        assert!(width > 0 && height > 0 && height <= 8);
        assert!(glyphs.len() == width as usize * PRINTABLE_COUNT);
        Self {
            width,
            height,
            glyphs,
        }
    }

    /// Glyph width in pixels.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Glyph height in pixels.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Returns the column bytes for `code`, or `None` when the code has no glyph.
    pub fn glyph(&self, code: u8) -> Option<&'static [u8]> {
        if !(FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&code) {
            return None;
        }
        let glyphs: &'static [u8] = self.glyphs;
        let width = self.width as usize;
        let start = (code - FIRST_PRINTABLE) as usize * width;
        glyphs.get(start..start + width)
    }
}

/// 6x8 font: a 5x7 face plus one blank spacing column.
pub static FONT_6X8: Font = Font::new(6, 8, &FONT_6X8_DATA);

#[rustfmt::skip]
const FONT_6X8_DATA: [u8; 6 * PRINTABLE_COUNT] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // space
    0x00, 0x00, 0x5F, 0x00, 0x00, 0x00, // !
    0x00, 0x07, 0x00, 0x07, 0x00, 0x00, // "
    0x14, 0x7F, 0x14, 0x7F, 0x14, 0x00, // #
    0x24, 0x2A, 0x7F, 0x2A, 0x12, 0x00, // $
    0x23, 0x13, 0x08, 0x64, 0x62, 0x00, // %
    0x36, 0x49, 0x56, 0x20, 0x50, 0x00, // &
    0x00, 0x08, 0x07, 0x03, 0x00, 0x00, // '
    0x00, 0x1C, 0x22, 0x41, 0x00, 0x00, // (
    0x00, 0x41, 0x22, 0x1C, 0x00, 0x00, // )
    0x2A, 0x1C, 0x7F, 0x1C, 0x2A, 0x00, // *
    0x08, 0x08, 0x3E, 0x08, 0x08, 0x00, // +
    0x00, 0x80, 0x70, 0x30, 0x00, 0x00, // ,
    0x08, 0x08, 0x08, 0x08, 0x08, 0x00, // -
    0x00, 0x00, 0x60, 0x60, 0x00, 0x00, // .
    0x20, 0x10, 0x08, 0x04, 0x02, 0x00, // /
    0x3E, 0x51, 0x49, 0x45, 0x3E, 0x00, // 0
    0x00, 0x42, 0x7F, 0x40, 0x00, 0x00, // 1
    0x72, 0x49, 0x49, 0x49, 0x46, 0x00, // 2
    0x21, 0x41, 0x49, 0x4D, 0x33, 0x00, // 3
    0x18, 0x14, 0x12, 0x7F, 0x10, 0x00, // 4
    0x27, 0x45, 0x45, 0x45, 0x39, 0x00, // 5
    0x3C, 0x4A, 0x49, 0x49, 0x31, 0x00, // 6
    0x41, 0x21, 0x11, 0x09, 0x07, 0x00, // 7
    0x36, 0x49, 0x49, 0x49, 0x36, 0x00, // 8
    0x46, 0x49, 0x49, 0x29, 0x1E, 0x00, // 9
    0x00, 0x00, 0x14, 0x00, 0x00, 0x00, // :
    0x00, 0x40, 0x34, 0x00, 0x00, 0x00, // ;
    0x00, 0x08, 0x14, 0x22, 0x41, 0x00, // <
    0x14, 0x14, 0x14, 0x14, 0x14, 0x00, // =
    0x00, 0x41, 0x22, 0x14, 0x08, 0x00, // >
    0x02, 0x01, 0x59, 0x09, 0x06, 0x00, // ?
    0x3E, 0x41, 0x5D, 0x59, 0x4E, 0x00, // @
    0x7C, 0x12, 0x11, 0x12, 0x7C, 0x00, // A
    0x7F, 0x49, 0x49, 0x49, 0x36, 0x00, // B
    0x3E, 0x41, 0x41, 0x41, 0x22, 0x00, // C
    0x7F, 0x41, 0x41, 0x41, 0x3E, 0x00, // D
    0x7F, 0x49, 0x49, 0x49, 0x41, 0x00, // E
    0x7F, 0x09, 0x09, 0x09, 0x01, 0x00, // F
    0x3E, 0x41, 0x41, 0x51, 0x73, 0x00, // G
    0x7F, 0x08, 0x08, 0x08, 0x7F, 0x00, // H
    0x00, 0x41, 0x7F, 0x41, 0x00, 0x00, // I
    0x20, 0x40, 0x41, 0x3F, 0x01, 0x00, // J
    0x7F, 0x08, 0x14, 0x22, 0x41, 0x00, // K
    0x7F, 0x40, 0x40, 0x40, 0x40, 0x00, // L
    0x7F, 0x02, 0x1C, 0x02, 0x7F, 0x00, // M
    0x7F, 0x04, 0x08, 0x10, 0x7F, 0x00, // N
    0x3E, 0x41, 0x41, 0x41, 0x3E, 0x00, // O
    0x7F, 0x09, 0x09, 0x09, 0x06, 0x00, // P
    0x3E, 0x41, 0x51, 0x21, 0x5E, 0x00, // Q
    0x7F, 0x09, 0x19, 0x29, 0x46, 0x00, // R
    0x26, 0x49, 0x49, 0x49, 0x32, 0x00, // S
    0x03, 0x01, 0x7F, 0x01, 0x03, 0x00, // T
    0x3F, 0x40, 0x40, 0x40, 0x3F, 0x00, // U
    0x1F, 0x20, 0x40, 0x20, 0x1F, 0x00, // V
    0x3F, 0x40, 0x38, 0x40, 0x3F, 0x00, // W
    0x63, 0x14, 0x08, 0x14, 0x63, 0x00, // X
    0x03, 0x04, 0x78, 0x04, 0x03, 0x00, // Y
    0x61, 0x59, 0x49, 0x4D, 0x43, 0x00, // Z
    0x00, 0x7F, 0x41, 0x41, 0x41, 0x00, // [
    0x02, 0x04, 0x08, 0x10, 0x20, 0x00, // \
    0x00, 0x41, 0x41, 0x41, 0x7F, 0x00, // ]
    0x04, 0x02, 0x01, 0x02, 0x04, 0x00, // ^
    0x40, 0x40, 0x40, 0x40, 0x40, 0x00, // _
    0x00, 0x03, 0x07, 0x08, 0x00, 0x00, // `
    0x20, 0x54, 0x54, 0x78, 0x40, 0x00, // a
    0x7F, 0x28, 0x44, 0x44, 0x38, 0x00, // b
    0x38, 0x44, 0x44, 0x44, 0x28, 0x00, // c
    0x38, 0x44, 0x44, 0x28, 0x7F, 0x00, // d
    0x38, 0x54, 0x54, 0x54, 0x18, 0x00, // e
    0x00, 0x08, 0x7E, 0x09, 0x02, 0x00, // f
    0x18, 0xA4, 0xA4, 0x9C, 0x78, 0x00, // g
    0x7F, 0x08, 0x04, 0x04, 0x78, 0x00, // h
    0x00, 0x44, 0x7D, 0x40, 0x00, 0x00, // i
    0x20, 0x40, 0x40, 0x3D, 0x00, 0x00, // j
    0x7F, 0x10, 0x28, 0x44, 0x00, 0x00, // k
    0x00, 0x41, 0x7F, 0x40, 0x00, 0x00, // l
    0x7C, 0x04, 0x78, 0x04, 0x78, 0x00, // m
    0x7C, 0x08, 0x04, 0x04, 0x78, 0x00, // n
    0x38, 0x44, 0x44, 0x44, 0x38, 0x00, // o
    0xFC, 0x18, 0x24, 0x24, 0x18, 0x00, // p
    0x18, 0x24, 0x24, 0x18, 0xFC, 0x00, // q
    0x7C, 0x08, 0x04, 0x04, 0x08, 0x00, // r
    0x48, 0x54, 0x54, 0x54, 0x24, 0x00, // s
    0x04, 0x04, 0x3F, 0x44, 0x24, 0x00, // t
    0x3C, 0x40, 0x40, 0x20, 0x7C, 0x00, // u
    0x1C, 0x20, 0x40, 0x20, 0x1C, 0x00, // v
    0x3C, 0x40, 0x30, 0x40, 0x3C, 0x00, // w
    0x44, 0x28, 0x10, 0x28, 0x44, 0x00, // x
    0x4C, 0x90, 0x90, 0x90, 0x7C, 0x00, // y
    0x44, 0x64, 0x54, 0x4C, 0x44, 0x00, // z
    0x00, 0x08, 0x36, 0x41, 0x00, 0x00, // {
    0x00, 0x00, 0x77, 0x00, 0x00, 0x00, // |
    0x00, 0x41, 0x36, 0x08, 0x00, 0x00, // }
    0x02, 0x01, 0x02, 0x04, 0x02, 0x00, // ~
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_dimensions() {
        assert_eq!(FONT_6X8.width(), 6);
        assert_eq!(FONT_6X8.height(), 8);
        assert_eq!(PRINTABLE_COUNT, 95);
    }

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(FONT_6X8.glyph(b' '), Some(&[0u8; 6][..]));
        assert_eq!(
            FONT_6X8.glyph(b'A'),
            Some(&[0x7C, 0x12, 0x11, 0x12, 0x7C, 0x00][..])
        );
        assert_eq!(FONT_6X8.glyph(b'~').map(<[u8]>::len), Some(6));
    }

    #[test]
    fn test_unprintable_codes_have_no_glyph() {
        assert_eq!(FONT_6X8.glyph(0), None);
        assert_eq!(FONT_6X8.glyph(b'\n'), None);
        assert_eq!(FONT_6X8.glyph(0x1F), None);
        assert_eq!(FONT_6X8.glyph(0x7F), None);
        assert_eq!(FONT_6X8.glyph(0xFF), None);
    }

    #[test]
    fn test_spacing_column_is_blank() {
        for code in FIRST_PRINTABLE..=LAST_PRINTABLE {
            let glyph = FONT_6X8.glyph(code).unwrap();
            assert_eq!(glyph[5], 0, "glyph {:#04X}", code);
        }
    }
}
