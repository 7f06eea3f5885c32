//! Renderer-agnostic stylized output and the drawing surface it targets.

use crate::{luminance, BlockGrid, Cell, Position, Rgb};

/// How a block is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// Flat square filling the block
    Square,
    /// Centered disc whose radius grows with brightness, on black
    Circle,
}

/// Result of one processing tick
#[derive(Debug, Clone, PartialEq)]
pub enum StylizedOutput {
    Blocks {
        blocks: BlockGrid,
        size: u32,
        shape: BlockShape,
    },
    Cells {
        cells: Vec<Cell>,
        width: u32,
        height: u32,
    },
}

/// Flat-color fill primitives provided by a display collaborator
pub trait DrawingSurface {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb);

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb);

    /// Fill a simple polygon using the given vertex order
    fn fill_polygon(&mut self, points: &[Position], color: Rgb);
}

/// Disc radius for a block of the given color and size
pub fn circle_radius(r: f64, g: f64, b: f64, size: f64) -> f64 {
    luminance(r, g, b) / 255.0 * (size / 2.0)
}

impl StylizedOutput {
    /// Pixel dimensions the output covers
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            StylizedOutput::Blocks { blocks, size, .. } => {
                (blocks.cols as u32 * size, blocks.rows as u32 * size)
            }
            StylizedOutput::Cells { width, height, .. } => (*width, *height),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StylizedOutput::Blocks { blocks, .. } => blocks.is_empty(),
            StylizedOutput::Cells { cells, .. } => cells.iter().all(Cell::is_empty),
        }
    }

    /// Issue fill calls for every element; empty cells are skipped
    pub fn draw<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        match self {
            StylizedOutput::Blocks { blocks, size, shape } => {
                let s = *size as f64;
                if *shape == BlockShape::Circle && !blocks.is_empty() {
                    let (w, h) = self.dimensions();
                    surface.fill_rect(0.0, 0.0, w as f64, h as f64, [0, 0, 0]);
                }
                for (col, row, block) in blocks.iter() {
                    let (x, y) = (col as f64 * s, row as f64 * s);
                    let color = block.to_rgb();
                    match shape {
                        BlockShape::Square => surface.fill_rect(x, y, s, s, color),
                        BlockShape::Circle => {
                            let radius = circle_radius(block.r, block.g, block.b, s);
                            surface.fill_circle(x + s / 2.0, y + s / 2.0, radius, color);
                        }
                    }
                }
            }
            StylizedOutput::Cells { cells, .. } => {
                for cell in cells.iter().filter(|c| !c.is_empty()) {
                    surface.fill_polygon(&cell.polygon, cell.seed.color.to_rgb());
                }
            }
        }
    }
}
