//! Raster canvas the simulation draws into, and its PNG encoding.

use crate::grid::Grid;
use life_core::{Result, Rgba, SimulationConfig};

/// Something that can present a grid
pub trait Renderer {
    fn draw(&mut self, grid: &Grid) -> Result<()>;
}

/// RGBA8 pixel buffer; live cells are filled squares of `cell_size` pixels
pub struct Canvas {
    width: u32,
    height: u32,
    cell_size: u32,
    fill: Rgba,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, cell_size: u32) -> Self {
        Self {
            width,
            height,
            cell_size,
            fill: Rgba::PURPLE,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.canvas_width, config.canvas_height, config.cell_size)
    }

    /// Color at pixel `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = self.offset(x, y);
        Rgba([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Clear, then fill every live cell of `grid`
    pub fn paint(&mut self, grid: &Grid) {
        self.clear();
        let cell = self.cell_size;
        for pos in grid.live_cells() {
            let x = pos.col as u32 * cell;
            let y = pos.row as u32 * cell;
            self.fill_rect(x, y, cell);
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Fill a square, clipped to the canvas
    fn fill_rect(&mut self, x: u32, y: u32, side: u32) {
        let x_end = x.saturating_add(side).min(self.width);
        let y_end = y.saturating_add(side).min(self.height);
        let color = self.fill.0;

        for py in y.min(self.height)..y_end {
            for px in x.min(self.width)..x_end {
                let i = self.offset(px, py);
                self.pixels[i..i + 4].copy_from_slice(&color);
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Encode the current pixels as an 8-bit RGBA PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(bytes)
    }
}

impl Renderer for Canvas {
    fn draw(&mut self, grid: &Grid) -> Result<()> {
        self.paint(grid);
        Ok(())
    }
}
