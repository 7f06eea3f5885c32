//! Block averaging: reduces a color grid to a coarser grid of mean colors.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{ColorGrid, ColorSample};

/// Mean color over a block of samples. Channels are not rounded or clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Block {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Block {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean RGB distance to a palette color
    pub fn dist_sq(&self, color: &ColorSample) -> f64 {
        let dr = self.r - color.r as f64;
        let dg = self.g - color.g as f64;
        let db = self.b - color.b as f64;
        dr * dr + dg * dg + db * db
    }

    /// Round to the nearest 8-bit color for display
    pub fn to_rgb(&self) -> crate::Rgb {
        [
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
        ]
    }
}

impl From<ColorSample> for Block {
    fn from(c: ColorSample) -> Self {
        Self::new(c.r as f64, c.g as f64, c.b as f64)
    }
}

/// Row-major grid of blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockGrid {
    pub cols: usize,
    pub rows: usize,
    pub blocks: Vec<Block>,
}

impl BlockGrid {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, col: usize, row: usize) -> Block {
        self.blocks[row * self.cols + col]
    }

    /// Iterate `(col, row, block)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Block)> + '_ {
        let cols = self.cols.max(1);
        self.blocks
            .iter()
            .enumerate()
            .map(move |(i, b)| (i % cols, i / cols, b))
    }

    /// Same shape, each block transformed
    pub fn map(&self, f: impl Fn(&Block) -> Block) -> BlockGrid {
        BlockGrid {
            cols: self.cols,
            rows: self.rows,
            blocks: self.blocks.iter().map(f).collect(),
        }
    }
}

/// Average `size × size` windows of `grid`.
///
/// Output is `floor(height/size) × floor(width/size)`; leftover rows and
/// columns at the bottom/right edge are dropped. Panics if `size` is zero.
pub fn aggregate(grid: &ColorGrid, size: usize) -> BlockGrid {
    assert!(size > 0, "block size must be positive");

    let cols = grid.width() / size;
    let rows = grid.height() / size;
    if cols == 0 || rows == 0 {
        return BlockGrid::default();
    }

    let average_row = |by: usize| -> Vec<Block> {
        (0..cols).map(|bx| average_block(grid, bx, by, size)).collect()
    };

    #[cfg(feature = "parallel")]
    let blocks: Vec<Block> = (0..rows).into_par_iter().flat_map_iter(average_row).collect();
    #[cfg(not(feature = "parallel"))]
    let blocks: Vec<Block> = (0..rows).flat_map(average_row).collect();

    tracing::trace!(cols, rows, size, "aggregated blocks");

    BlockGrid { cols, rows, blocks }
}

fn average_block(grid: &ColorGrid, bx: usize, by: usize, size: usize) -> Block {
    let (mut r, mut g, mut b, mut count) = (0u64, 0u64, 0u64, 0u64);
    for dy in 0..size {
        let py = by * size + dy;
        if py >= grid.height() {
            break;
        }
        let row = grid.row(py);
        for dx in 0..size {
            let px = bx * size + dx;
            if px >= grid.width() {
                break;
            }
            let c = row[px];
            r += c.r as u64;
            g += c.g as u64;
            b += c.b as u64;
            count += 1;
        }
    }
    let n = count as f64;
    Block::new(r as f64 / n, g as f64 / n, b as f64 / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_16x16() {
        let grid = ColorGrid::filled(16, 16, ColorSample::new(100, 150, 200));
        let blocks = aggregate(&grid, 8);
        assert_eq!((blocks.cols, blocks.rows), (2, 2));
        for (_, _, b) in blocks.iter() {
            assert_eq!(*b, Block::new(100.0, 150.0, 200.0));
        }
    }

    #[test]
    fn test_dimension_law() {
        for (w, h) in [(0, 0), (1, 1), (7, 9), (17, 33), (64, 48)] {
            for size in 1..=10 {
                let grid = ColorGrid::filled(w, h, ColorSample::new(1, 2, 3));
                let blocks = aggregate(&grid, size);
                let (cols, rows) = (w / size, h / size);
                if cols == 0 || rows == 0 {
                    assert!(blocks.is_empty(), "{}x{} size {}", w, h, size);
                } else {
                    assert_eq!((blocks.cols, blocks.rows), (cols, rows));
                    assert_eq!(blocks.blocks.len(), cols * rows);
                }
            }
        }
    }

    #[test]
    fn test_average_is_unrounded() {
        // 2x2 block: 0, 1, 0, 2 on red -> 0.75
        let rows = vec![
            vec![ColorSample::new(0, 0, 0), ColorSample::new(1, 0, 0)],
            vec![ColorSample::new(0, 0, 0), ColorSample::new(2, 0, 0)],
        ];
        let grid = ColorGrid::from_rows(rows).unwrap();
        let blocks = aggregate(&grid, 2);
        assert_eq!(blocks.get(0, 0).r, 0.75);
    }

    #[test]
    fn test_remainder_dropped() {
        // Right column is bright but falls outside the only kept block.
        let mut rows = vec![vec![ColorSample::new(10, 10, 10); 3]; 2];
        for row in &mut rows {
            row[2] = ColorSample::new(255, 255, 255);
        }
        let grid = ColorGrid::from_rows(rows).unwrap();
        let blocks = aggregate(&grid, 2);
        assert_eq!((blocks.cols, blocks.rows), (1, 1));
        assert_eq!(blocks.get(0, 0), Block::new(10.0, 10.0, 10.0));
    }

    #[test]
    fn test_block_order_row_major() {
        let mut img = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
        // Bottom-left 2x2 block red
        for y in 2..4 {
            for x in 0..2 {
                img.put_pixel(x, y, image::Rgb([255, 0, 0]));
            }
        }
        let blocks = aggregate(&ColorGrid::from(&img), 2);
        assert_eq!(blocks.get(0, 1), Block::new(255.0, 0.0, 0.0));
        assert_eq!(blocks.get(1, 0), Block::new(0.0, 0.0, 0.0));
        assert_eq!(blocks.blocks[2], Block::new(255.0, 0.0, 0.0));
    }

    #[test]
    #[should_panic]
    fn test_zero_size_panics() {
        aggregate(&ColorGrid::filled(4, 4, ColorSample::default()), 0);
    }
}
