//! NCGR (Nitro Character Graphic Resource) - sprite pixels, magic `RGCN`.
//!
//! ## Layout
//! ```text
//! [0x00] Envelope header "RGCN"     (0x10 bytes)
//! [0x10] RAHC record header         (8 bytes)
//! [0x18] TileRows                   (u16 LE)
//! [0x1A] TileColumns                (u16 LE)
//! [0x1C] BitDepth                   (u32 LE) - 3 = 4bpp, 4 = 8bpp
//! [0x20] Padding / mapping flags    (8 bytes)
//! [0x28] DataSize                   (u32 LE)
//! [0x2C] DataOffset                 (u32 LE)
//! [0x30] Pixel data
//! ```
//!
//! Two flavors share this container:
//!
//! * **Standard** sprites store 4-bit pixels as 8×8 tiles.
//! * **Encrypted** sprites (character graphics in some titles) store 4-bit
//!   pixels linearly, masked with the LCG from [`crate::crypto::sprite`].
//!
//! The tile-count fields are not trustworthy for either flavor, so decoding
//! takes the image size from the caller.

use std::io::Cursor;

use super::envelope::Envelope;
use crate::crypto::sprite::{self, CipherParams, SeedOrigin};
use crate::graphics::{PixelGrid, Size};
use crate::utils::{le_u16, le_u32, le_u64};
use crate::{Error, Result};

/// Size of standard tiled sprites.
pub const STANDARD_SIZE: Size = Size::new(64, 64);

/// Size of encrypted character sprites.
pub const ENCRYPTED_SIZE: Size = Size::new(160, 80);

const DEPTH_4BPP: u32 = 3;
const RAHC_HEADER_SIZE: usize = 0x18;

/// Parsed sprite file, borrowing its pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ncgr<'a> {
    pub tile_rows: u16,
    pub tile_columns: u16,
    /// Declared bit depth code.
    pub bit_depth: u32,
    /// Pixel bytes following the RAHC header.
    pub data: &'a [u8],
}

impl<'a> Ncgr<'a> {
    /// Parse a sprite file held in `buf`.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let env = Envelope::parse_expecting(buf, b"RGCN")?;
        let rahc = env.first(b"RAHC")?;

        let mut r = Cursor::new(rahc.payload);
        let tile_rows = le_u16(&mut r)?;
        let tile_columns = le_u16(&mut r)?;
        let bit_depth = le_u32(&mut r)?;
        let _mapping = le_u64(&mut r)?;
        let _data_size = le_u32(&mut r)?;
        let _data_offset = le_u32(&mut r)?;

        Ok(Self {
            tile_rows,
            tile_columns,
            bit_depth,
            data: &rahc.payload[RAHC_HEADER_SIZE..],
        })
    }

    fn require_4bpp(&self) -> Result<()> {
        if self.bit_depth != DEPTH_4BPP {
            return Err(Error::UnsupportedFormat {
                what: "sprite bit depth",
                code: self.bit_depth,
            });
        }
        Ok(())
    }

    /// Decode as a standard tiled 4-bit sprite.
    pub fn decode_standard(&self, size: Size) -> Result<PixelGrid> {
        self.require_4bpp()?;
        PixelGrid::unpack_4bpp_tiled(self.data, size)
    }

    /// Unmask and decode as an encrypted linear 4-bit sprite.
    pub fn decode_encrypted(
        &self,
        size: Size,
        params: CipherParams,
        origin: SeedOrigin,
    ) -> Result<PixelGrid> {
        self.require_4bpp()?;
        let len = size.area().div_ceil(2);
        let masked = self.data.get(..len).ok_or(Error::UnexpectedEof)?;
        let plain = sprite::unmask(masked, params, origin);
        PixelGrid::unpack_4bpp_linear(&plain, size)
    }
}

/// Decode a standard tiled sprite file.
pub fn decode_standard(buf: &[u8], size: Size) -> Result<PixelGrid> {
    Ncgr::parse(buf)?.decode_standard(size)
}

/// Decode an encrypted sprite file.
pub fn decode_encrypted(
    buf: &[u8],
    size: Size,
    params: CipherParams,
    origin: SeedOrigin,
) -> Result<PixelGrid> {
    Ncgr::parse(buf)?.decode_encrypted(size, params, origin)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::formats::envelope::tests::build as envelope;
    use crate::graphics::Layout;

    /// A sprite file around `pixels` with the given depth code.
    pub(crate) fn build(pixels: &[u8], bit_depth: u32) -> Vec<u8> {
        let mut rahc = Vec::new();
        rahc.extend(8u16.to_le_bytes());
        rahc.extend(8u16.to_le_bytes());
        rahc.extend(bit_depth.to_le_bytes());
        rahc.extend(0u64.to_le_bytes());
        rahc.extend((pixels.len() as u32).to_le_bytes());
        rahc.extend(0x18u32.to_le_bytes());
        rahc.extend(pixels);
        envelope(b"RGCN", &[(b"RAHC", &rahc), (b"SOPC", &[0u8; 8])])
    }

    #[test]
    fn standard_sprites_are_tiled() {
        // Second tile (x 8..16, y 0..8) is all index 5.
        let mut pixels = vec![0u8; 64 * 64 / 2];
        pixels[32..64].fill(0x55);
        let grid = decode_standard(&build(&pixels, 3), STANDARD_SIZE).unwrap();
        assert_eq!(grid.layout, Layout::Tiled);
        assert_eq!(grid.get(7, 0), Some(0));
        assert_eq!(grid.get(8, 0), Some(5));
        assert_eq!(grid.get(15, 7), Some(5));
        assert_eq!(grid.get(8, 8), Some(0));
    }

    #[test]
    fn encrypted_sprites_are_linear_and_unmasked() {
        let params = CipherParams::DIAMOND_PEARL;
        let size = Size::new(8, 2);
        // Plain words: seed 0x0000, then 0x4321 and 0x8765 / 0x0000.
        let plain = [0x0000u16, 0x4321, 0x8765, 0x0000];
        let mut mask = params.mask_stream(0).skip(1);
        let mut data = 0u16.to_le_bytes().to_vec();
        for w in &plain[1..] {
            data.extend((w ^ mask.next().unwrap()).to_le_bytes());
        }

        let grid = decode_encrypted(&build(&data, 3), size, params, SeedOrigin::First).unwrap();
        assert_eq!(grid.layout, Layout::Linear);
        assert_eq!(&grid.pixels()[..8], &[0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(&grid.pixels()[8..], &[5, 6, 7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn other_depths_are_unsupported() {
        let file = build(&[0u8; 64 * 64], 4);
        let err = decode_standard(&file, STANDARD_SIZE).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Unsupported);
    }

    #[test]
    fn short_pixel_data() {
        let file = build(&[0u8; 10], 3);
        assert!(matches!(
            decode_encrypted(&file, ENCRYPTED_SIZE, CipherParams::PLATINUM, SeedOrigin::First),
            Err(Error::UnexpectedEof)
        ));
    }
}
