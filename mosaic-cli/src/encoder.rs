//! Streaming GIF encoder: frames are indexed and written as they render.

use std::path::Path;

use anyhow::Context;

pub struct GifEncoder {
    encoder: gif::Encoder<std::fs::File>,
    width: u16,
    height: u16,
    frame_delay: u16,
}

impl GifEncoder {
    pub fn create(output: &Path, width: u32, height: u32, fps: u32) -> anyhow::Result<Self> {
        let (w, h) = (
            u16::try_from(width).context("frame too wide for GIF")?,
            u16::try_from(height).context("frame too tall for GIF")?,
        );
        let file = std::fs::File::create(output)
            .with_context(|| format!("failed to create output: {:?}", output))?;
        let mut encoder = gif::Encoder::new(file, w, h, &[])?;
        encoder.set_repeat(gif::Repeat::Infinite)?;
        // GIF delays are in hundredths of a second
        let frame_delay = (100 / fps.max(1)).max(1) as u16;
        Ok(Self { encoder, width: w, height: h, frame_delay })
    }

    /// Write one frame's raw RGB pixel data
    pub fn write_frame(&mut self, rgb_data: &[u8]) -> anyhow::Result<()> {
        let expected = self.width as usize * self.height as usize * 3;
        anyhow::ensure!(
            rgb_data.len() == expected,
            "frame has {} bytes, expected {}",
            rgb_data.len(),
            expected
        );
        let (pixels, mut palette) = index_colors(rgb_data);
        palette.resize(256 * 3, 0);
        let mut frame = gif::Frame::from_palette_pixels(self.width, self.height, pixels, palette, None);
        frame.delay = self.frame_delay;
        self.encoder.write_frame(&frame)?;
        Ok(())
    }
}

/// Map RGB pixels to palette indices.
///
/// Mosaics have few distinct colors, so the first 256 are kept exactly and
/// any further colors fall back to their nearest kept entry.
fn index_colors(rgb_data: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut pixels: Vec<u8> = Vec::with_capacity(rgb_data.len() / 3);
    let mut palette: Vec<[u8; 3]> = Vec::new();

    for chunk in rgb_data.chunks_exact(3) {
        let rgb = [chunk[0], chunk[1], chunk[2]];
        let idx = palette.iter().position(|&c| c == rgb).unwrap_or_else(|| {
            if palette.len() < 256 {
                palette.push(rgb);
                palette.len() - 1
            } else {
                palette
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, c)| {
                        let dr = c[0] as i32 - rgb[0] as i32;
                        let dg = c[1] as i32 - rgb[1] as i32;
                        let db = c[2] as i32 - rgb[2] as i32;
                        dr * dr + dg * dg + db * db
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            }
        });
        pixels.push(idx as u8);
    }

    let flat_palette: Vec<u8> = palette.iter().flat_map(|c| c.iter().copied()).collect();
    (pixels, flat_palette)
}
