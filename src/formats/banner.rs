//! ROM banner - icon and localized titles shown by the system menu.
//!
//! ## Layout (0x840 bytes)
//! ```text
//! [0x000] Version                     (u16 LE)
//! [0x002] CRC16 of 0x020..0x840       (u16 LE)
//! [0x004] Reserved                    (0x1C bytes)
//! [0x020] Icon pixels                 (0x200 bytes, 32×32, 4bpp, tiled)
//! [0x220] Icon palette                (16 × RGB555)
//! [0x240] Titles                      (6 × 0x100 bytes, UTF-16LE, NUL-padded)
//!         Japanese, English, French, German, Italian, Spanish
//! ```

use std::io::Read;

use crate::graphics::{
    ChannelDepth, GrayRamp, IndexedImage, Palette, PixelGrid, RenderOptions, Size, render,
};
use crate::utils::{bytesa, bytesv, le_u16, utf16_padded_string};
use crate::Result;

const ICON_SIZE: Size = Size::new(32, 32);
const ICON_BYTES: usize = 0x200;
const TITLE_BYTES: usize = 0x100;

/// Languages with a title slot in the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Language {
    Japanese,
    English,
    French,
    German,
    Italian,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Japanese,
        Language::English,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Spanish,
    ];
}

/// Parsed banner.
#[derive(Debug, Clone)]
pub struct Banner {
    pub version: u16,
    pub crc16: u16,
    /// Raw tiled icon pixels.
    pub icon_pixels: Vec<u8>,
    pub icon_palette: Palette,
    /// Titles in [`Language::ALL`] order.
    pub titles: [String; 6],
}

impl Banner {
    /// Size of the banner data that is read.
    pub const SIZE: usize = 0x840;

    /// Parse a banner from `r`, positioned at the banner start.
    pub fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let version = le_u16(r)?;
        let crc16 = le_u16(r)?;
        let _reserved = bytesa::<0x1C>(r)?;
        let icon_pixels = bytesv(r, ICON_BYTES)?;
        let palette_bytes = bytesa::<32>(r)?;
        let icon_palette = Palette::from_words(&palette_bytes, 16)?;

        let mut titles: [String; 6] = Default::default();
        for title in &mut titles {
            *title = utf16_padded_string(&bytesv(r, TITLE_BYTES)?);
        }

        Ok(Self {
            version,
            crc16,
            icon_pixels,
            icon_palette,
            titles,
        })
    }

    /// Title in `language`. Lines are separated by `\n`.
    pub fn title(&self, language: Language) -> &str {
        &self.titles[language as usize]
    }

    /// The 32×32 icon as palette indices.
    pub fn icon_grid(&self) -> Result<PixelGrid> {
        PixelGrid::unpack_4bpp_tiled(&self.icon_pixels, ICON_SIZE)
    }

    /// The icon rendered with its palette; index 0 is transparent.
    pub fn icon(&self, depth: ChannelDepth) -> Result<IndexedImage> {
        let options = RenderOptions {
            depth,
            transparent_zero: true,
            ramp: GrayRamp::Ascending,
        };
        Ok(render(&self.icon_grid()?, Some(&self.icon_palette), options))
    }
}
