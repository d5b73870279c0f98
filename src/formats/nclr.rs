//! NCLR (Nitro CoLor Resource) - palette file, magic `RLCN`.
//!
//! ## Layout
//! ```text
//! [0x00] Envelope header "RLCN"     (0x10 bytes)
//! [0x10] TTLP record header         (8 bytes)
//! [0x18] BitDepth                   (u32 LE) - 3 = 4bpp, 4 = 8bpp
//! [0x1C] Padding                    (u32)
//! [0x20] DataSize                   (u32 LE)
//! [0x24] DataOffset                 (u32 LE)
//! [0x28] Color words                (RGB555, u16 LE each)
//! ```
//!
//! Only the first 16 colors are read; the size fields are unreliable
//! across titles.

use std::io::Cursor;

use super::envelope::Envelope;
use crate::graphics::Palette;
use crate::utils::le_u32;
use crate::Result;

/// Number of colors read from a palette file.
pub const PALETTE_COLORS: usize = 16;

const TTLP_HEADER_SIZE: usize = 0x10;

/// Parsed palette file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nclr {
    /// Declared bit depth code.
    pub bit_depth: u32,
    pub palette: Palette,
}

impl Nclr {
    /// Parse a palette file held in `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let env = Envelope::parse_expecting(buf, b"RLCN")?;
        let ttlp = env.first(b"TTLP")?;

        let mut r = Cursor::new(ttlp.payload);
        let bit_depth = le_u32(&mut r)?;
        let _padding = le_u32(&mut r)?;
        let _data_size = le_u32(&mut r)?;
        let _data_offset = le_u32(&mut r)?;

        let palette = Palette::from_words(&ttlp.payload[TTLP_HEADER_SIZE..], PALETTE_COLORS)?;
        Ok(Self { bit_depth, palette })
    }
}
