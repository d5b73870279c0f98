//! RGB555 color words and palettes.
//!
//! A DS color is a little-endian 16-bit word:
//! ```text
//! bit 15      14-10   9-5    4-0
//!     unused  blue    green  red
//! ```

use crate::utils::{le_words, range};
use crate::Result;

/// One 15-bit color word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb555(pub u16);

/// Channel depth of emitted colors.
///
/// Image encoders that only understand 8-bit channels want
/// [`ChannelDepth::Scaled8`]; tools that keep the hardware values want
/// [`ChannelDepth::Native5`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelDepth {
    /// Raw 0–31 channel values.
    Native5,
    /// Channels rescaled to 0–255 with `c * 255 / 31`.
    #[default]
    Scaled8,
}

impl ChannelDepth {
    /// Bits per channel.
    pub fn bits(self) -> u8 {
        match self {
            ChannelDepth::Native5 => 5,
            ChannelDepth::Scaled8 => 8,
        }
    }

    /// Largest channel value at this depth.
    pub fn max(self) -> u8 {
        ((1u16 << self.bits()) - 1) as u8
    }
}

impl Rgb555 {
    /// Hardware channel values, each 0–31.
    pub fn channels(self) -> [u8; 3] {
        let w = self.0;
        [
            (w & 0x1F) as u8,
            ((w >> 5) & 0x1F) as u8,
            ((w >> 10) & 0x1F) as u8,
        ]
    }

    /// `[r, g, b]` at the requested depth.
    pub fn to_rgb(self, depth: ChannelDepth) -> [u8; 3] {
        let c = self.channels();
        match depth {
            ChannelDepth::Native5 => c,
            ChannelDepth::Scaled8 => c.map(|v| (v as u16 * 255 / 31) as u8),
        }
    }
}

/// An ordered color table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<Rgb555>,
}

impl Palette {
    /// Read `count` little-endian color words from the start of `data`.
    pub fn from_words(data: &[u8], count: usize) -> Result<Self> {
        let data = range(data, 0, count * 2)?;
        Ok(Self {
            colors: le_words(data).map(Rgb555).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All colors as `[r, g, b]` at the requested depth.
    pub fn to_rgb(&self, depth: ChannelDepth) -> Vec<[u8; 3]> {
        self.colors.iter().map(|c| c.to_rgb(depth)).collect()
    }
}
