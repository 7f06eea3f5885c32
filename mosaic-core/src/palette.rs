//! Fixed color palettes and nearest-color quantization.

use crate::{Block, BlockGrid, ColorSample, MosaicError, Result, Rgb};

/// Ordered, non-empty list of colors. Order only matters for tie-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<ColorSample>,
}

impl Palette {
    /// Create a palette, rejecting an empty color list
    pub fn new(colors: Vec<ColorSample>) -> Result<Self> {
        if colors.is_empty() {
            return Err(MosaicError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    pub fn from_rgb(colors: &[Rgb]) -> Result<Self> {
        Self::new(colors.iter().copied().map(ColorSample::from).collect())
    }

    /// High-contrast 16-color palette with a few skin tones
    pub fn pop_art() -> Self {
        const POP_ART: [Rgb; 16] = [
            [255, 0, 0],     // red
            [0, 0, 255],     // blue
            [0, 255, 0],     // green
            [255, 255, 0],   // yellow
            [255, 165, 0],   // orange
            [128, 0, 128],   // purple
            [255, 192, 203], // pink
            [255, 255, 255], // white
            [0, 0, 0],       // black
            [128, 128, 128], // gray
            [210, 180, 140], // tan
            [160, 82, 45],   // brown
            [105, 57, 30],   // dark brown
            [0, 255, 255],   // cyan
            [255, 0, 255],   // magenta
            [255, 240, 245], // linen
        ];
        Self {
            colors: POP_ART.iter().copied().map(ColorSample::from).collect(),
        }
    }

    pub fn colors(&self) -> &[ColorSample] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Nearest entry by squared RGB distance; the earliest entry wins ties
    pub fn nearest(&self, block: &Block) -> ColorSample {
        let mut closest = self.colors[0];
        let mut min_dist = f64::INFINITY;
        for color in &self.colors {
            let dist = block.dist_sq(color);
            if dist < min_dist {
                min_dist = dist;
                closest = *color;
            }
        }
        closest
    }
}

/// Replace every block with its nearest palette color
pub fn quantize(blocks: &BlockGrid, palette: &Palette) -> BlockGrid {
    blocks.map(|b| Block::from(palette.nearest(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Palette::new(vec![]), Err(MosaicError::EmptyPalette)));
        assert!(matches!(Palette::from_rgb(&[]), Err(MosaicError::EmptyPalette)));
    }

    #[test]
    fn test_pop_art_len() {
        let palette = Palette::pop_art();
        assert_eq!(palette.len(), 16);
        assert!(!palette.is_empty());
    }

    #[test]
    fn test_nearest_minimizes_distance() {
        let palette = Palette::pop_art();
        let probes = [
            Block::new(250.0, 10.0, 5.0),
            Block::new(120.0, 130.0, 125.0),
            Block::new(200.0, 175.0, 150.0),
            Block::new(3.5, 0.2, 1.0),
        ];
        for probe in probes {
            let chosen = palette.nearest(&probe);
            let best = palette
                .colors()
                .iter()
                .map(|c| probe.dist_sq(c))
                .fold(f64::INFINITY, f64::min);
            assert_eq!(probe.dist_sq(&chosen), best);
        }
        assert_eq!(palette.nearest(&probes[0]), ColorSample::new(255, 0, 0));
        assert_eq!(palette.nearest(&probes[1]), ColorSample::new(128, 128, 128));
    }

    #[test]
    fn test_tie_keeps_first_entry() {
        // (100,0,0) is exactly 50 away from both entries.
        let a = ColorSample::new(50, 0, 0);
        let b = ColorSample::new(150, 0, 0);
        let probe = Block::new(100.0, 0.0, 0.0);

        let ab = Palette::new(vec![a, b]).unwrap();
        let ba = Palette::new(vec![b, a]).unwrap();
        assert_eq!(ab.nearest(&probe), a);
        assert_eq!(ba.nearest(&probe), b);
    }

    #[test]
    fn test_quantize_preserves_shape() {
        let blocks = BlockGrid {
            cols: 2,
            rows: 1,
            blocks: vec![Block::new(10.0, 10.0, 10.0), Block::new(240.0, 250.0, 250.0)],
        };
        let palette = Palette::from_rgb(&[[0, 0, 0], [255, 255, 255]]).unwrap();
        let out = quantize(&blocks, &palette);
        assert_eq!((out.cols, out.rows), (2, 1));
        assert_eq!(out.blocks[0], Block::new(0.0, 0.0, 0.0));
        assert_eq!(out.blocks[1], Block::new(255.0, 255.0, 255.0));
    }

    #[test]
    fn test_quantize_empty_grid() {
        let out = quantize(&BlockGrid::default(), &Palette::pop_art());
        assert!(out.is_empty());
    }
}
