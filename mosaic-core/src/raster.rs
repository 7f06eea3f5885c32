//! Software rasterizer implementing `DrawingSurface` over an RGB image.
//!
//! Coverage is decided at pixel centers with half-open spans. Polygon spans
//! are widened by `SEAM_EPSILON` so neighbouring cells whose shared edge was
//! computed with slightly different rounding leave no unpainted seam.

use crate::{DrawingSurface, Position, Rgb, StylizedOutput};

const SEAM_EPSILON: f64 = 1e-7;

/// RGB image canvas, black on creation
pub struct Canvas {
    image: image::RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: image::RgbImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &image::RgbImage {
        &self.image
    }

    pub fn into_image(self) -> image::RgbImage {
        self.image
    }

    /// Pixel index range whose centers fall in `[lo, hi)`, clipped to `0..limit`
    fn span(lo: f64, hi: f64, limit: u32) -> std::ops::Range<u32> {
        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).ceil().min(limit as f64);
        if end <= start {
            return 0..0;
        }
        start as u32..end as u32
    }

    fn fill_span(&mut self, y: u32, xs: std::ops::Range<u32>, color: Rgb) {
        for x in xs {
            self.image.put_pixel(x, y, image::Rgb(color));
        }
    }
}

impl DrawingSurface for Canvas {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let cols = Self::span(x, x + w, self.width());
        for row in Self::span(y, y + h, self.height()) {
            self.fill_span(row, cols.clone(), color);
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        if radius <= 0.0 {
            return;
        }
        let r_sq = radius * radius;
        for row in Self::span(cy - radius, cy + radius, self.height()) {
            let dy = row as f64 + 0.5 - cy;
            let half = (r_sq - dy * dy).max(0.0).sqrt();
            // Closed disc: include centers exactly on the rim.
            let cols = Self::span(cx - half, cx + half + f64::EPSILON, self.width());
            self.fill_span(row, cols, color);
        }
    }

    fn fill_polygon(&mut self, points: &[Position], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        if max_y - min_y <= 2.0 * SEAM_EPSILON {
            return;
        }

        let mut crossings: Vec<f64> = Vec::with_capacity(4);
        for row in Self::span(min_y - SEAM_EPSILON, max_y + SEAM_EPSILON, self.height()) {
            // Rows whose center sits just outside the extent sample its nearest edge.
            let cy = (row as f64 + 0.5).clamp(min_y + SEAM_EPSILON, max_y - SEAM_EPSILON);
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = &points[(i + 1) % points.len()];
                if (a.y > cy) != (b.y > cy) {
                    crossings.push(a.x + (cy - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let cols = Self::span(pair[0] - SEAM_EPSILON, pair[1] + SEAM_EPSILON, self.width());
                self.fill_span(row, cols, color);
            }
        }
    }
}

impl StylizedOutput {
    /// Rasterize onto a fresh black canvas of the output's dimensions
    pub fn to_image(&self) -> image::RgbImage {
        let (width, height) = self.dimensions();
        let mut canvas = Canvas::new(width, height);
        self.draw(&mut canvas);
        canvas.into_image()
    }

    /// Raw RGB bytes of `to_image`
    pub fn render(&self) -> Vec<u8> {
        self.to_image().into_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bounding_box, build_cells, ColorSample, Seed};

    #[test]
    fn test_fill_rect_exact_pixels() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(1.0, 1.0, 2.0, 2.0, [9, 9, 9]);
        let img = canvas.into_image();
        let painted: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == [9, 9, 9])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(painted, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_fill_rect_clipped_to_canvas() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect(-5.0, -5.0, 100.0, 100.0, [1, 1, 1]);
        assert!(canvas.image().pixels().all(|p| p.0 == [1, 1, 1]));
    }

    #[test]
    fn test_fill_circle_symmetric() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_circle(4.0, 4.0, 2.0, [255, 0, 0]);
        let img = canvas.image();
        assert_eq!(img.get_pixel(3, 3).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(4, 4).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(7, 4).0, [0, 0, 0]);
        let count = img.pixels().filter(|p| p.0 == [255, 0, 0]).count();
        assert_eq!(count % 4, 0);
    }

    #[test]
    fn test_zero_radius_draws_nothing() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_circle(2.0, 2.0, 0.0, [255, 255, 255]);
        assert!(canvas.image().pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_fill_polygon_rectangle() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_polygon(&bounding_box(5.0, 10.0), [7, 7, 7]);
        let img = canvas.image();
        assert_eq!(img.get_pixel(4, 9).0, [7, 7, 7]);
        assert_eq!(img.get_pixel(5, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_adjacent_cells_leave_no_seams() {
        // Every pixel gets painted when all cells are drawn with a non-black color.
        let seeds: Vec<Seed> = [(3.0, 3.0), (17.0, 4.0), (9.0, 15.0), (2.0, 18.0), (18.0, 18.0)]
            .iter()
            .map(|&(x, y)| Seed::at(x, y, ColorSample::new(200, 100, 50)))
            .collect();
        let output = StylizedOutput::Cells { cells: build_cells(&seeds, 20, 20), width: 20, height: 20 };
        let img = output.to_image();
        assert_eq!(img.dimensions(), (20, 20));
        assert!(img.pixels().all(|p| p.0 == [200, 100, 50]));
    }
}
