//! Per-tick pipeline: frame in, stylized output out.

use std::str::FromStr;

use crate::{
    aggregate, build_cells, quantize, sample_with, BlockShape, ColorGrid, MosaicError, Palette,
    Result, SamplerConfig, StylizedOutput,
};

/// Stylization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Flat averaged blocks
    #[default]
    Square,
    /// Brightness-sized discs per block
    Circle,
    /// Adaptive Voronoi mosaic
    Voronoi,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Ok(Mode::Square),
            "circle" => Ok(Mode::Circle),
            "voronoi" => Ok(Mode::Voronoi),
            other => Err(format!(
                "unknown mode '{}' (expected square, circle, or voronoi)",
                other
            )),
        }
    }
}

/// Configuration for one tick. Block size is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    mode: Mode,
    block_size: u32,
    palette: Option<Palette>,
    sampler: SamplerConfig,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Square,
            block_size: 8,
            palette: None,
            sampler: SamplerConfig::default(),
        }
    }
}

impl StyleConfig {
    pub fn new(mode: Mode, block_size: u32) -> Result<Self> {
        if block_size == 0 {
            return Err(MosaicError::InvalidBlockSize(block_size));
        }
        Ok(Self { mode, block_size, ..Self::default() })
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn without_palette(mut self) -> Self {
        self.palette = None;
        self
    }

    pub fn with_block_size(mut self, block_size: u32) -> Result<Self> {
        if block_size == 0 {
            return Err(MosaicError::InvalidBlockSize(block_size));
        }
        self.block_size = block_size;
        Ok(self)
    }

    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn sampler(&self) -> &SamplerConfig {
        &self.sampler
    }
}

/// Run one full pass over `grid`. An empty grid yields an empty output.
pub fn stylize(grid: &ColorGrid, config: &StyleConfig) -> StylizedOutput {
    let shape = match config.mode {
        Mode::Square => BlockShape::Square,
        Mode::Circle => BlockShape::Circle,
        Mode::Voronoi => {
            let seeds = sample_with(grid, &config.sampler);
            let cells = build_cells(&seeds, grid.width(), grid.height());
            return StylizedOutput::Cells {
                cells,
                width: grid.width() as u32,
                height: grid.height() as u32,
            };
        }
    };

    let mut blocks = aggregate(grid, config.block_size as usize);
    if let Some(palette) = &config.palette {
        blocks = quantize(&blocks, palette);
    }
    StylizedOutput::Blocks { blocks, size: config.block_size, shape }
}

/// Supplier of frames, e.g. a camera or a decoded image sequence
pub trait FrameSource {
    /// The next frame, or `None` when none is available yet
    fn next_frame(&mut self) -> Option<ColorGrid>;
}

impl<F: FnMut() -> Option<ColorGrid>> FrameSource for F {
    fn next_frame(&mut self) -> Option<ColorGrid> {
        self()
    }
}

/// Drives a frame source through the pipeline, one tick at a time
pub struct Stylizer<S: FrameSource> {
    source: S,
    config: StyleConfig,
    last: Option<StylizedOutput>,
}

impl<S: FrameSource> Stylizer<S> {
    pub fn new(source: S, config: StyleConfig) -> Self {
        Self { source, config, last: None }
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: StyleConfig) {
        self.config = config;
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Process the next frame. While `paused`, the previous output is
    /// returned and the source is not polled; a paused first tick has no
    /// previous output, so it polls the source once.
    pub fn tick(&mut self, paused: bool) -> &StylizedOutput {
        if !paused {
            self.last = None;
        }
        let source = &mut self.source;
        let config = &self.config;
        self.last.get_or_insert_with(|| {
            let grid = source.next_frame().unwrap_or_default();
            stylize(&grid, config)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Block, ColorSample};

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Voronoi".parse::<Mode>().unwrap(), Mode::Voronoi);
        assert_eq!("circle".parse::<Mode>().unwrap(), Mode::Circle);
        assert!("hexagon".parse::<Mode>().is_err());
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(matches!(StyleConfig::new(Mode::Square, 0), Err(MosaicError::InvalidBlockSize(0))));
        assert!(StyleConfig::default().with_block_size(0).is_err());
        assert_eq!(StyleConfig::default().with_block_size(4).unwrap().block_size(), 4);
    }

    #[test]
    fn test_empty_grid_every_mode() {
        for mode in [Mode::Square, Mode::Circle, Mode::Voronoi] {
            let config = StyleConfig::new(mode, 8).unwrap().with_palette(Palette::pop_art());
            let out = stylize(&ColorGrid::empty(), &config);
            assert!(out.is_empty(), "{:?}", mode);
            assert_eq!(out.dimensions(), (0, 0));
        }
    }

    #[test]
    fn test_palette_applied_to_blocks() {
        let grid = ColorGrid::filled(16, 8, ColorSample::new(250, 5, 5));
        let config = StyleConfig::new(Mode::Square, 8).unwrap().with_palette(Palette::pop_art());
        match stylize(&grid, &config) {
            StylizedOutput::Blocks { blocks, size, shape } => {
                assert_eq!((blocks.cols, blocks.rows, size), (2, 1, 8));
                assert_eq!(shape, BlockShape::Square);
                assert!(blocks.blocks.iter().all(|b| *b == Block::new(255.0, 0.0, 0.0)));
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_voronoi_mode_uses_grid_dimensions() {
        let grid = ColorGrid::filled(300, 200, ColorSample::new(9, 9, 9));
        let config = StyleConfig::default().with_mode(Mode::Voronoi);
        match stylize(&grid, &config) {
            StylizedOutput::Cells { cells, width, height } => {
                assert_eq!((width, height), (300, 200));
                // Uniform grid: one seed per 128x128 tile (3 x 2 tiles)
                assert_eq!(cells.len(), 6);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_stylizer_pause_reuses_output() {
        let mut frames = vec![
            ColorGrid::filled(8, 8, ColorSample::new(0, 0, 0)),
            ColorGrid::filled(8, 8, ColorSample::new(255, 255, 255)),
        ]
        .into_iter();
        let mut polls = 0;
        let source = || {
            polls += 1;
            frames.next()
        };
        let mut stylizer = Stylizer::new(source, StyleConfig::default());

        let first = stylizer.tick(false).clone();
        let paused = stylizer.tick(true).clone();
        assert_eq!(first, paused);

        let second = stylizer.tick(false).clone();
        assert_ne!(first, second);

        // Exhausted source: empty output, not an error
        assert!(stylizer.tick(false).is_empty());
        drop(stylizer);
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_paused_first_tick_polls_once() {
        let mut polls = 0;
        let source = || {
            polls += 1;
            Some(ColorGrid::filled(8, 8, ColorSample::new(10, 20, 30)))
        };
        let mut stylizer = Stylizer::new(source, StyleConfig::default());

        let first = stylizer.tick(true).clone();
        assert!(!first.is_empty());
        assert_eq!(stylizer.tick(true), &first);
        drop(stylizer);
        assert_eq!(polls, 1);
    }
}
