//! Indexed pixel grids and the nibble-unpacking conventions used by DS
//! graphics.
//!
//! Two orders exist for 4-bit data:
//!
//! * **Tiled** - the image is cut into 8×8 tiles stored row-major across the
//!   tile grid; the 64 pixels of each tile are themselves row-major.
//! * **Linear** - plain row-major order over the whole image.
//!
//! In both cases each byte carries two pixels, low nibble first.

use crate::{Error, Result};

/// Edge length of a hardware tile, in pixels.
pub const TILE_DIM: usize = 8;

const TILE_PIXELS: usize = TILE_DIM * TILE_DIM;

/// Pixel storage order of the source data a grid was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// 8×8 tiles, row-major across tiles and inside each tile.
    Tiled,
    /// Row-major over the whole image.
    Linear,
}

/// Width and height of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered.
    pub const fn area(self) -> usize {
        self.width * self.height
    }
}

/// A decoded image where every pixel is an index into a palette.
///
/// Pixels are stored row-major regardless of the [`Layout`] of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    pub width: usize,
    pub height: usize,
    /// Bit depth of the indices (4 for the 16-color formats).
    pub bits_per_pixel: u8,
    /// Order the source data was stored in.
    pub layout: Layout,
    pixels: Vec<u8>,
}

impl PixelGrid {
    /// An all-zero grid.
    pub fn new(size: Size, bits_per_pixel: u8, layout: Layout) -> Self {
        Self {
            width: size.width,
            height: size.height,
            bits_per_pixel,
            layout,
            pixels: vec![0; size.area()],
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Row-major palette indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Index at `(x, y)`, or [`None`] outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Set the index at `(x, y)`. Writes outside the grid are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = value;
        }
    }

    /// Unpack 4-bit row-major data.
    pub fn unpack_4bpp_linear(data: &[u8], size: Size) -> Result<Self> {
        let mut grid = Self::new(size, 4, Layout::Linear);
        for (idx, value) in nibbles(data, size.area())?.enumerate() {
            grid.pixels[idx] = value;
        }
        Ok(grid)
    }

    /// Unpack 4-bit data stored as 8×8 tiles.
    ///
    /// Both dimensions must be multiples of [`TILE_DIM`].
    pub fn unpack_4bpp_tiled(data: &[u8], size: Size) -> Result<Self> {
        if size.width % TILE_DIM != 0 || size.height % TILE_DIM != 0 {
            return Err(Error::Parse("tiled image size is not a multiple of 8"));
        }
        let mut grid = Self::new(size, 4, Layout::Tiled);
        for (idx, value) in nibbles(data, size.area())?.enumerate() {
            let (x, y) = tiled_position(idx, size.width);
            grid.set(x, y, value);
        }
        Ok(grid)
    }
}

/// Map a linear nibble index in tiled data to `(x, y)` image coordinates.
pub fn tiled_position(idx: usize, width: usize) -> (usize, usize) {
    let tiles_per_row = width / TILE_DIM;
    let tile = idx / TILE_PIXELS;
    let within = idx % TILE_PIXELS;
    let tile_x = tile % tiles_per_row;
    let tile_y = tile / tiles_per_row;
    (
        tile_x * TILE_DIM + within % TILE_DIM,
        tile_y * TILE_DIM + within / TILE_DIM,
    )
}

/// The first `count` nibbles of `data`, low nibble of each byte first.
fn nibbles(data: &[u8], count: usize) -> Result<impl Iterator<Item = u8> + '_> {
    let bytes = count.div_ceil(2);
    let data = data.get(..bytes).ok_or(Error::UnexpectedEof)?;
    Ok(data
        .iter()
        .flat_map(|&b| [b & 0x0F, b >> 4])
        .take(count))
}
