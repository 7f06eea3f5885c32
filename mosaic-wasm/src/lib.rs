//! WASM bindings for mosaic-core.
//!
//! Exposes a stateful `MosaicEngine` that takes camera frames as RGBA
//! `ImageData` buffers and returns flat typed arrays for efficient JS interop.

use wasm_bindgen::prelude::*;
use mosaic_core::{BlockShape, ColorGrid, FrameSource, Mode, Palette, StyleConfig, Stylizer, StylizedOutput};

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Result of one stylized frame.
/// All data is exposed as flat typed arrays for zero-copy JS access.
#[wasm_bindgen]
pub struct MosaicFrame {
    kind: String,
    block_size: u32,
    cols: u32,
    rows: u32,
    block_colors_flat: Vec<f64>,
    polygon_offsets: Vec<u32>,
    polygon_points_flat: Vec<f64>,
    cell_colors_flat: Vec<u8>,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl MosaicFrame {
    /// "square", "circle", or "cells"
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.kind.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    #[wasm_bindgen(getter)]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[wasm_bindgen(getter)]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Flat unrounded RGB averages per block, row-major (length = cols*rows*3)
    #[wasm_bindgen(getter)]
    pub fn block_colors(&self) -> Vec<f64> {
        self.block_colors_flat.clone()
    }

    /// Start index (in points) of each non-empty cell polygon, plus a final end
    /// index (length = num_cells + 1)
    #[wasm_bindgen(getter)]
    pub fn polygon_offsets(&self) -> Vec<u32> {
        self.polygon_offsets.clone()
    }

    /// Flat [x0,y0, x1,y1, ...] polygon vertices in clip order
    #[wasm_bindgen(getter)]
    pub fn polygon_points(&self) -> Vec<f64> {
        self.polygon_points_flat.clone()
    }

    /// Flat RGB seed colors per non-empty cell (length = num_cells * 3)
    #[wasm_bindgen(getter)]
    pub fn cell_colors(&self) -> Vec<u8> {
        self.cell_colors_flat.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl MosaicFrame {
    fn from_output(output: &StylizedOutput) -> Self {
        let (width, height) = output.dimensions();
        let mut frame = Self {
            kind: String::new(),
            block_size: 0,
            cols: 0,
            rows: 0,
            block_colors_flat: Vec::new(),
            polygon_offsets: vec![0],
            polygon_points_flat: Vec::new(),
            cell_colors_flat: Vec::new(),
            width,
            height,
        };
        match output {
            StylizedOutput::Blocks { blocks, size, shape } => {
                frame.kind = match shape {
                    BlockShape::Square => "square".into(),
                    BlockShape::Circle => "circle".into(),
                };
                frame.block_size = *size;
                frame.cols = blocks.cols as u32;
                frame.rows = blocks.rows as u32;
                frame.block_colors_flat = blocks.blocks.iter().flat_map(|b| [b.r, b.g, b.b]).collect();
            }
            StylizedOutput::Cells { cells, .. } => {
                frame.kind = "cells".into();
                for cell in cells.iter().filter(|c| !c.is_empty()) {
                    frame.polygon_points_flat.extend(cell.polygon.iter().flat_map(|p| [p.x, p.y]));
                    frame.polygon_offsets.push((frame.polygon_points_flat.len() / 2) as u32);
                    frame.cell_colors_flat.extend(cell.seed.color.to_rgb());
                }
            }
        }
        frame
    }
}

fn parse_mode(mode: &str) -> Result<Mode, JsError> {
    mode.parse::<Mode>().map_err(|e| JsError::new(&e))
}

/// Stateful stylization engine.
/// Holds the style configuration, the latest submitted frame and the last
/// output, so a paused preview keeps showing the same mosaic.
#[wasm_bindgen]
pub struct MosaicEngine {
    stylizer: Stylizer<PendingFrame>,
}

/// Frame slot filled by JS before each tick
#[derive(Default)]
struct PendingFrame(Option<ColorGrid>);

impl FrameSource for PendingFrame {
    fn next_frame(&mut self) -> Option<ColorGrid> {
        self.0.take()
    }
}

#[wasm_bindgen]
impl MosaicEngine {
    /// Create an engine for `mode` ("square", "circle", "voronoi").
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, block_size: u32) -> Result<MosaicEngine, JsError> {
        let config = StyleConfig::new(parse_mode(mode)?, block_size)?;
        Ok(Self { stylizer: Stylizer::new(PendingFrame::default(), config) })
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsError> {
        let config = self.stylizer.config().clone().with_mode(parse_mode(mode)?);
        self.stylizer.set_config(config);
        Ok(())
    }

    pub fn set_block_size(&mut self, block_size: u32) -> Result<(), JsError> {
        let config = self.stylizer.config().clone().with_block_size(block_size)?;
        self.stylizer.set_config(config);
        Ok(())
    }

    /// Use the built-in pop-art palette for block modes
    pub fn use_pop_art_palette(&mut self) {
        let config = self.stylizer.config().clone().with_palette(Palette::pop_art());
        self.stylizer.set_config(config);
    }

    /// Use a custom palette from flat [r0,g0,b0, r1,g1,b1, ...]
    pub fn set_palette(&mut self, rgb: &[u8]) -> Result<(), JsError> {
        let colors: Vec<[u8; 3]> = rgb.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        let palette = Palette::from_rgb(&colors)?;
        let config = self.stylizer.config().clone().with_palette(palette);
        self.stylizer.set_config(config);
        Ok(())
    }

    /// Disable palette quantization
    pub fn clear_palette(&mut self) {
        let config = self.stylizer.config().clone().without_palette();
        self.stylizer.set_config(config);
    }

    /// Stylize one RGBA frame. While `paused`, the previous result is returned
    /// and the frame is ignored.
    pub fn process(&mut self, rgba_data: &[u8], width: u32, height: u32, paused: bool) -> Result<MosaicFrame, JsError> {
        self.submit(rgba_data, width, height, paused)?;
        Ok(MosaicFrame::from_output(self.stylizer.tick(paused)))
    }

    /// Stylize one RGBA frame and rasterize it to RGBA pixels at the output
    /// size: `cols*block_size × rows*block_size` for block modes, the frame
    /// size for cells.
    pub fn render(&mut self, rgba_data: &[u8], width: u32, height: u32, paused: bool) -> Result<Vec<u8>, JsError> {
        self.submit(rgba_data, width, height, paused)?;
        let rgb = self.stylizer.tick(paused).render();
        let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
        for px in rgb.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Ok(rgba)
    }
}

impl MosaicEngine {
    fn submit(&mut self, rgba_data: &[u8], width: u32, height: u32, paused: bool) -> Result<(), JsError> {
        if paused {
            return Ok(());
        }
        let grid = ColorGrid::from_rgba(rgba_data, width as usize, height as usize)?;
        self.stylizer.source_mut().0 = Some(grid);
        Ok(())
    }
}
