//! Frame sources: a still image or a directory of frames.
//!
//! Both apply the same preparation (resize, optional mirror) before handing a
//! `ColorGrid` to the pipeline.

use std::path::{Path, PathBuf};

use anyhow::Context;
use mosaic_core::{ColorGrid, FrameSource};
use tracing::{debug, warn};

const FRAME_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Resolve target dimensions from style file and CLI overrides.
/// Any CLI dimension replaces the style file's pair as a whole.
/// If only one dimension is given, the other is computed to preserve aspect ratio.
pub fn resolve_dimensions(
    orig_w: u32,
    orig_h: u32,
    style_w: Option<u32>,
    style_h: Option<u32>,
    cli_w: Option<u32>,
    cli_h: Option<u32>,
) -> (u32, u32) {
    let (w, h) = if cli_w.is_some() || cli_h.is_some() {
        (cli_w, cli_h)
    } else {
        (style_w, style_h)
    };
    match (w, h) {
        (Some(tw), Some(th)) => (tw, th),
        (Some(tw), None) => {
            let th = (orig_h as f64 * tw as f64 / orig_w as f64).round() as u32;
            (tw, th.max(1))
        }
        (None, Some(th)) => {
            let tw = (orig_w as f64 * th as f64 / orig_h as f64).round() as u32;
            (tw.max(1), th)
        }
        (None, None) => (orig_w, orig_h),
    }
}

/// Resize and mirror settings applied to every frame
#[derive(Debug, Clone, Copy)]
pub struct FramePrep {
    pub width: u32,
    pub height: u32,
    pub mirror: bool,
}

impl FramePrep {
    pub fn apply(&self, mut image: image::RgbImage) -> image::RgbImage {
        if image.dimensions() != (self.width, self.height) {
            image = image::imageops::resize(
                &image,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            );
        }
        if self.mirror {
            image::imageops::flip_horizontal_in_place(&mut image);
        }
        image
    }
}

pub fn load_rgb(path: &Path) -> anyhow::Result<image::RgbImage> {
    Ok(image::open(path)
        .with_context(|| format!("failed to open image: {:?}", path))?
        .to_rgb8())
}

/// Sorted frame files in `dir`
pub fn list_frames(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read frame directory: {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    frames.sort();
    Ok(frames)
}

/// Yields the same prepared still image on every tick
pub struct ImageSource {
    grid: ColorGrid,
}

impl ImageSource {
    pub fn new(image: image::RgbImage, prep: FramePrep) -> Self {
        Self { grid: ColorGrid::from(&prep.apply(image)) }
    }
}

impl FrameSource for ImageSource {
    fn next_frame(&mut self) -> Option<ColorGrid> {
        Some(self.grid.clone())
    }
}

/// Decodes frames from a list of files in order
pub struct SequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    prep: FramePrep,
}

impl SequenceSource {
    pub fn new(paths: Vec<PathBuf>, prep: FramePrep) -> Self {
        Self { paths, next: 0, prep }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for SequenceSource {
    /// An unreadable frame yields `None` so the tick renders empty and the
    /// sequence carries on.
    fn next_frame(&mut self) -> Option<ColorGrid> {
        let path = self.paths.get(self.next)?;
        self.next += 1;
        match load_rgb(path) {
            Ok(image) => {
                debug!(?path, "decoded frame");
                Some(ColorGrid::from(&self.prep.apply(image)))
            }
            Err(e) => {
                warn!("skipping frame {:?}: {:#}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dimensions() {
        assert_eq!(resolve_dimensions(640, 480, None, None, None, None), (640, 480));
        assert_eq!(resolve_dimensions(640, 480, Some(320), None, None, None), (320, 240));
        assert_eq!(resolve_dimensions(640, 480, None, None, Some(100), Some(50)), (100, 50));
        assert_eq!(resolve_dimensions(640, 480, Some(100), Some(50), None, None), (100, 50));
    }

    #[test]
    fn test_cli_dimension_replaces_style_pair() {
        // A lone CLI height keeps the aspect ratio instead of pairing with the style width.
        assert_eq!(resolve_dimensions(640, 480, Some(320), None, None, Some(120)), (160, 120));
        assert_eq!(resolve_dimensions(640, 480, Some(320), Some(100), Some(64), None), (64, 48));
    }

    #[test]
    fn test_prep_mirrors() {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        let prep = FramePrep { width: 2, height: 1, mirror: true };
        let out = prep.apply(img);
        assert_eq!(out.get_pixel(1, 0).0, [255, 0, 0]);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
