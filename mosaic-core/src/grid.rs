//! Row-major grid of color samples, the input to every stage.

use crate::{ColorSample, MosaicError, Result};

/// A `height × width` grid of RGB samples, origin top-left.
///
/// May be empty (0×0) before the first frame arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorGrid {
    width: usize,
    height: usize,
    samples: Vec<ColorSample>,
}

impl ColorGrid {
    /// The empty grid
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a flat row-major sample buffer
    pub fn from_samples(width: usize, height: usize, samples: Vec<ColorSample>) -> Result<Self> {
        let expected = buffer_len(width, height, 1);
        if samples.len() != expected {
            return Err(MosaicError::BufferSize { expected, actual: samples.len() });
        }
        // A grid with no columns or rows has no samples at all.
        if width == 0 || height == 0 {
            return Ok(Self::empty());
        }
        Ok(Self { width, height, samples })
    }

    /// Build from nested rows; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<ColorSample>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut samples = Vec::with_capacity(width * height);
        for (row, r) in rows.into_iter().enumerate() {
            if r.len() != width {
                return Err(MosaicError::RaggedRows { row, len: r.len(), expected: width });
            }
            samples.extend(r);
        }
        Self::from_samples(width, height, samples)
    }

    /// Build a grid filled with a single color
    pub fn filled(width: usize, height: usize, color: ColorSample) -> Self {
        if width == 0 || height == 0 {
            return Self::empty();
        }
        Self { width, height, samples: vec![color; width * height] }
    }

    /// Convert RGBA pixel data (e.g. a canvas `ImageData` buffer), dropping alpha
    pub fn from_rgba(rgba: &[u8], width: usize, height: usize) -> Result<Self> {
        let expected = buffer_len(width, height, 4);
        if rgba.len() != expected {
            return Err(MosaicError::BufferSize { expected, actual: rgba.len() });
        }
        let samples = rgba
            .chunks_exact(4)
            .map(|px| ColorSample::new(px[0], px[1], px[2]))
            .collect();
        Self::from_samples(width, height, samples)
    }

    pub fn from_rgb_image(image: &image::RgbImage) -> Self {
        let (w, h) = image.dimensions();
        let samples = image.pixels().map(|&px| ColorSample::from(px)).collect();
        // Buffer length always matches the image dimensions.
        Self::from_samples(w as usize, h as usize, samples).unwrap_or_default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at column `x`, row `y`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> ColorSample {
        debug_assert!(x < self.width && y < self.height);
        self.samples[y * self.width + x]
    }

    pub fn row(&self, y: usize) -> &[ColorSample] {
        &self.samples[y * self.width..(y + 1) * self.width]
    }

    pub fn samples(&self) -> &[ColorSample] {
        &self.samples
    }
}

/// `width * height * channels`, or `usize::MAX` on overflow
fn buffer_len(width: usize, height: usize, channels: usize) -> usize {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .unwrap_or(usize::MAX)
}

impl From<&image::RgbImage> for ColorGrid {
    fn from(image: &image::RgbImage) -> Self {
        Self::from_rgb_image(image)
    }
}
