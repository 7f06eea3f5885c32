//! Core mosaic stylization library.
//!
//! Turns a color grid (one camera frame) into abstracted output: averaged
//! color blocks, optionally snapped to a fixed palette, or an adaptive
//! Voronoi mosaic whose cell density follows local color variance.
//! Per-block and per-seed work is Rayon-parallelized behind the `parallel`
//! feature.

mod block;
mod color;
mod grid;
mod output;
mod palette;
mod pipeline;
mod raster;
mod sampler;
mod site;
mod voronoi;

pub use block::{aggregate, Block, BlockGrid};
pub use color::{luminance, ColorSample};
pub use grid::ColorGrid;
pub use output::{circle_radius, BlockShape, DrawingSurface, StylizedOutput};
pub use palette::{quantize, Palette};
pub use pipeline::{stylize, FrameSource, Mode, StyleConfig, Stylizer};
pub use raster::Canvas;
pub use sampler::{sample, sample_with, SamplerConfig};
pub use site::{bounding_box, signed_area, Polygon, Position, Seed};
pub use voronoi::{build_cells, clip_polygon, intersect_bisector, Cell};

/// RGB color tuple
pub type Rgb = [u8; 3];

/// Error type for mosaic operations
#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    #[error("Palette must contain at least one color")]
    EmptyPalette,

    #[error("Block size must be positive, got {0}")]
    InvalidBlockSize(u32),

    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Grid rows have unequal lengths (row {row} has {len}, expected {expected})")]
    RaggedRows { row: usize, len: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, MosaicError>;
