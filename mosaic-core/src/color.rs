//! Color sample type and RGB distance helpers.

use crate::Rgb;

/// One RGB sample of a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance in RGB space
    pub fn dist_sq(&self, other: &ColorSample) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    pub fn to_rgb(self) -> Rgb {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb> for ColorSample {
    fn from([r, g, b]: Rgb) -> Self {
        Self { r, g, b }
    }
}

impl From<image::Rgb<u8>> for ColorSample {
    fn from(px: image::Rgb<u8>) -> Self {
        Self::from(px.0)
    }
}

/// Perceived brightness (Rec. 601 weights), in `[0, 255]` for in-range input
pub fn luminance(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}
