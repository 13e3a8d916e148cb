//! PNG export of the panel framebuffer.

use anyhow::{Context, Result};
use ssd1306_panel_hw::Framebuffer;
use std::path::Path;

/// Encodes the framebuffer as an RGBA PNG, one image pixel per panel pixel.
pub fn encode_png(framebuffer: &Framebuffer) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(
            &mut out,
            framebuffer.width() as u32,
            framebuffer.height() as u32,
        );
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().context("Failed to write PNG header")?;
        writer
            .write_image_data(&framebuffer.to_rgba8())
            .context("Failed to encode PNG data")?;
        writer.finish().context("Failed to finish PNG")?;
    }
    Ok(out)
}

/// Writes a screenshot to disk.
pub fn save_png<P: AsRef<Path>>(framebuffer: &Framebuffer, path: P) -> Result<()> {
    let data = encode_png(framebuffer)?;
    std::fs::write(path.as_ref(), &data).context("Failed to write screenshot file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png() {
        let mut fb = Framebuffer::new();
        fb.fill_region(0, 8, 128, 8, true);
        let data = encode_png(&fb).unwrap();
        assert_eq!(&data[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoder = png::Decoder::new(std::io::Cursor::new(data));
        let mut reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 128);
        assert_eq!(reader.info().height, 64);

        let mut pixels = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut pixels).unwrap();
        let row_bytes = 128 * 4;
        assert_eq!(&pixels[..4], &[0, 0, 0, 255]);
        assert_eq!(&pixels[8 * row_bytes..8 * row_bytes + 4], &[255, 255, 255, 255]);
    }
}
