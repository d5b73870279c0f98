//! Pairing a pixel grid with colors.
//!
//! The output is still indexed: an [`IndexedImage`] carries the grid's
//! indices plus an RGBA color table, which is what palette-based image
//! encoders consume. [`IndexedImage::to_rgba`] expands it for encoders that
//! want true color.

use super::palette::{ChannelDepth, Palette};
use super::pixels::PixelGrid;

/// Direction of the grayscale ramp used when no palette is supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrayRamp {
    /// Index 0 is black, the highest index is white.
    #[default]
    Ascending,
    /// Index 0 is white, the highest index is black.
    Descending,
}

/// How to turn indices into colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOptions {
    /// Channel depth of the emitted color table.
    pub depth: ChannelDepth,
    /// Index 0 is fully transparent (the "color0" flag).
    pub transparent_zero: bool,
    /// Ramp used in place of a missing palette.
    pub ramp: GrayRamp,
}

/// An indexed image ready for an external encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: usize,
    pub height: usize,
    /// Row-major palette indices.
    pub indices: Vec<u8>,
    /// `[r, g, b, a]` per palette entry; channel depth per `depth`, alpha is
    /// always 0 or `depth.max()`.
    pub palette: Vec<[u8; 4]>,
    pub depth: ChannelDepth,
}

impl IndexedImage {
    /// Color of the pixel at `(x, y)`.
    ///
    /// Indices with no palette entry come back as transparent black.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.indices[y * self.width + x] as usize;
        Some(self.palette.get(idx).copied().unwrap_or([0; 4]))
    }

    /// Expand to row-major RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.indices
            .iter()
            .flat_map(|&i| self.palette.get(i as usize).copied().unwrap_or([0; 4]))
            .collect()
    }
}

/// A `levels`-step grayscale ramp.
pub fn grayscale(levels: usize, ramp: GrayRamp, depth: ChannelDepth) -> Vec<[u8; 3]> {
    let top = levels.saturating_sub(1).max(1);
    let max = depth.max() as usize;
    (0..levels)
        .map(|i| {
            let step = match ramp {
                GrayRamp::Ascending => i,
                GrayRamp::Descending => top - i.min(top),
            };
            let v = (step * max / top) as u8;
            [v, v, v]
        })
        .collect()
}

/// Attach colors to `grid`.
///
/// With no palette, a grayscale ramp with one step per index value is used
/// instead.
pub fn render(grid: &PixelGrid, palette: Option<&Palette>, options: RenderOptions) -> IndexedImage {
    let colors = match palette {
        Some(p) => p.to_rgb(options.depth),
        None => {
            let levels = 1usize << grid.bits_per_pixel.min(8);
            grayscale(levels, options.ramp, options.depth)
        }
    };

    let opaque = options.depth.max();
    let mut table: Vec<[u8; 4]> = colors
        .into_iter()
        .map(|[r, g, b]| [r, g, b, opaque])
        .collect();
    if options.transparent_zero {
        if let Some(first) = table.first_mut() {
            first[3] = 0;
        }
    }

    IndexedImage {
        width: grid.width,
        height: grid.height,
        indices: grid.pixels().to_vec(),
        palette: table,
        depth: options.depth,
    }
}
