//! BTX0 - texture container, also embedded in BMD0 model files.
//!
//! Parsing is two-phase: [`Btx0::parse`] reads every TEX0 block's metadata
//! (definitions and names), while texture and palette payloads are sliced
//! and decoded on request.
//!
//! ## Container
//! ```text
//! [0x00] Envelope header "BTX0"/"BMD0" (0x10 bytes, RecordCount = blocks)
//! [0x10] Block offsets                 (RecordCount × u32 LE, from file start)
//! [...]  Blocks                        (TEX0 here; BMD0 also carries MDL0)
//! ```
//!
//! ## TEX0 header (0x3C bytes)
//! ```text
//! [0x00] Magic "TEX0"                  (4 bytes)
//! [0x04] BlockLength                   (u32 LE)
//! [0x08] Padding                       (4 bytes)
//! [0x0C] TextureDataSize >> 3          (u16 LE)
//! [0x0E] TextureInfoOffset             (u16 LE)
//! [0x10] Padding                       (4 bytes)
//! [0x14] TextureDataOffset             (u32 LE)
//! [0x18] Padding                       (4 bytes)
//! [0x1C] Compressed texture fields     (0x10 bytes, format 5)
//! [0x2C] Padding                       (4 bytes)
//! [0x30] PaletteDataSize >> 3          (u16 LE)
//! [0x32] Padding                       (2 bytes)
//! [0x34] PaletteInfoOffset             (u32 LE)
//! [0x38] PaletteDataOffset             (u32 LE)
//! ```
//! All offsets are relative to the TEX0 block start.
//!
//! ## Info block (textures and palettes)
//! ```text
//! [0x00] Dummy                         (u8)
//! [0x01] Count                         (u8)
//! [0x02] SectionSize                   (u16 LE)
//! [0x04] UnknownHeaderSize, Size       (2 × u16 LE)
//! [0x08] Constant 0x17F                (u32 LE)
//! [0x0C] Unknown                       (Count × u32)
//! [...]  EntrySize, EntriesSize        (2 × u16 LE) - entry size 8 / 4
//! [...]  Entries                       (Count × EntrySize)
//! [...]  Names                         (Count × 16 bytes, NUL-padded)
//! ```
//!
//! Texture entry: `offset >> 3 (u16)`, parameters (u16), 4 unknown bytes.
//! Parameters: width class bits 4-6, height class bits 7-9, format bits
//! 10-12, color 0 transparent bit 13. Dimensions are `8 << class`.
//!
//! Palette entry: `offset >> 3 (u16)`, unknown (u16).

use std::io::{Cursor, Read, Seek, SeekFrom};

use super::envelope::EnvelopeHeader;
use crate::graphics::mosaic::{compose, grid_dimensions, order_by_suffix};
use crate::graphics::{
    ChannelDepth, GrayRamp, IndexedImage, Palette, PixelGrid, RenderOptions, Size, render,
};
use crate::utils::{bytesa, le_u16, le_u32, magic, padded_string, range, u8};
use crate::{Error, Result};

/// Bits per pixel, indexed by texture format.
const BITS_PER_PIXEL: [u32; 9] = [0, 8, 2, 4, 4, 8, 2, 8, 16];

const TEXTURE_ENTRY_SIZE: u16 = 8;
const PALETTE_ENTRY_SIZE: u16 = 4;
const NAME_SIZE: usize = 16;

/// Texture color format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureFormat(pub u8);

impl TextureFormat {
    /// 16-color paletted, the only format decoded to pixels.
    pub const PALETTE_16: Self = Self(3);
    /// 16-bit direct color, no palette.
    pub const DIRECT: Self = Self(7);

    pub fn bits_per_pixel(self) -> u32 {
        BITS_PER_PIXEL.get(self.0 as usize).copied().unwrap_or(0)
    }

    /// Palette entries used by this format, if it is paletted.
    pub fn palette_len(self) -> Option<usize> {
        if self == Self::DIRECT {
            return None;
        }
        match self.bits_per_pixel() {
            bpp @ 1..=8 => Some(1 << bpp),
            _ => None,
        }
    }
}

/// One texture definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureInfo {
    pub name: String,
    /// Offset of the pixels within the texture data region.
    pub offset: u32,
    pub width: usize,
    pub height: usize,
    pub format: TextureFormat,
    /// Palette index 0 is transparent.
    pub color0: bool,
}

impl TextureInfo {
    fn from_params(name: String, offset: u32, params: u16) -> Self {
        Self {
            name,
            offset,
            width: 8 << ((params >> 4) & 7),
            height: 8 << ((params >> 7) & 7),
            format: TextureFormat(((params >> 10) & 7) as u8),
            color0: params & (1 << 13) != 0,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Payload length in bytes.
    pub fn byte_len(&self) -> usize {
        self.width * self.height * self.format.bits_per_pixel() as usize / 8
    }
}

/// One palette definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteInfo {
    pub name: String,
    /// Offset of the colors within the palette data region.
    pub offset: u32,
}

/// A parsed TEX0 block.
#[derive(Debug, Clone)]
pub struct Tex0<'a> {
    pub texture_data_offset: u32,
    pub texture_data_len: u32,
    pub palette_data_offset: u32,
    pub palette_data_len: u32,
    pub textures: Vec<TextureInfo>,
    pub palettes: Vec<PaletteInfo>,
    block: &'a [u8],
}

impl<'a> Tex0<'a> {
    /// Parse the metadata of the TEX0 block at the start of `block`.
    pub fn parse(block: &'a [u8]) -> Result<Self> {
        let mut r = Cursor::new(block);
        magic(&mut r, b"TEX0")?;
        let length = le_u32(&mut r)?;
        let block = range(block, 0, length as usize)?;

        let _padding = le_u32(&mut r)?;
        let texture_data_len = le_u16(&mut r)? as u32 * 8;
        let texture_info_offset = le_u16(&mut r)?;
        let _padding = le_u32(&mut r)?;
        let texture_data_offset = le_u32(&mut r)?;
        let _padding = le_u32(&mut r)?;
        let _compressed = bytesa::<0x10>(&mut r)?;
        let _padding = le_u32(&mut r)?;
        let palette_data_len = le_u16(&mut r)? as u32 * 8;
        let _padding = le_u16(&mut r)?;
        let palette_info_offset = le_u32(&mut r)?;
        let palette_data_offset = le_u32(&mut r)?;

        r.seek(SeekFrom::Start(texture_info_offset as u64))?;
        let count = read_info_header(&mut r, TEXTURE_ENTRY_SIZE)?;
        let mut params = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = le_u16(&mut r)? as u32 * 8;
            let bits = le_u16(&mut r)?;
            let _unknown = le_u32(&mut r)?;
            params.push((offset, bits));
        }
        let mut textures = Vec::with_capacity(count);
        for (offset, bits) in params {
            textures.push(TextureInfo::from_params(read_name(&mut r)?, offset, bits));
        }

        r.seek(SeekFrom::Start(palette_info_offset as u64))?;
        let count = read_info_header(&mut r, PALETTE_ENTRY_SIZE)?;
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(le_u16(&mut r)? as u32 * 8);
            let _unknown = le_u16(&mut r)?;
        }
        let mut palettes = Vec::with_capacity(count);
        for offset in offsets {
            palettes.push(PaletteInfo {
                name: read_name(&mut r)?,
                offset,
            });
        }

        tracing::debug!(
            textures = textures.len(),
            palettes = palettes.len(),
            "parsed TEX0 block"
        );
        Ok(Self {
            texture_data_offset,
            texture_data_len,
            palette_data_offset,
            palette_data_len,
            textures,
            palettes,
            block,
        })
    }

    /// Index of the texture called `name`.
    pub fn find_texture(&self, name: &str) -> Option<usize> {
        self.textures.iter().position(|t| t.name == name)
    }

    /// Index of the palette called `name`.
    pub fn find_palette(&self, name: &str) -> Option<usize> {
        self.palettes.iter().position(|p| p.name == name)
    }

    /// Raw pixel bytes of texture `index`.
    pub fn texture_bytes(&self, index: usize) -> Result<&'a [u8]> {
        let info = self.textures.get(index).ok_or(Error::InvalidRange)?;
        let start = self.texture_data_offset as usize + info.offset as usize;
        range(self.block, start, info.byte_len())
    }

    /// Raw color words of palette `index`, sized for textures of `format`.
    pub fn palette_bytes(&self, index: usize, format: TextureFormat) -> Result<&'a [u8]> {
        let info = self.palettes.get(index).ok_or(Error::InvalidRange)?;
        let colors = format.palette_len().ok_or(Error::UnsupportedFormat {
            what: "palette format",
            code: format.0 as u32,
        })?;
        let start = self.palette_data_offset as usize + info.offset as usize;
        range(self.block, start, colors * 2)
    }

    /// Decode texture `index` into palette indices.
    ///
    /// Only [`TextureFormat::PALETTE_16`] is decoded; other formats fail
    /// with [`Error::UnsupportedFormat`].
    pub fn decode_texture(&self, index: usize) -> Result<PixelGrid> {
        let info = self.textures.get(index).ok_or(Error::InvalidRange)?;
        if info.format != TextureFormat::PALETTE_16 {
            return Err(Error::UnsupportedFormat {
                what: "texture format",
                code: info.format.0 as u32,
            });
        }
        PixelGrid::unpack_4bpp_linear(self.texture_bytes(index)?, info.size())
    }

    /// Decode palette `index` for textures of `format`.
    pub fn decode_palette(&self, index: usize, format: TextureFormat) -> Result<Palette> {
        let data = self.palette_bytes(index, format)?;
        Palette::from_words(data, data.len() / 2)
    }

    /// Decode every texture; a failure affects only its own slot.
    pub fn decode_all(&self) -> Vec<Result<PixelGrid>> {
        (0..self.textures.len()).map(|i| self.decode_texture(i)).collect()
    }

    /// Render texture `index`, with palette `palette` or a grayscale ramp.
    pub fn render_texture(
        &self,
        index: usize,
        palette: Option<usize>,
        depth: ChannelDepth,
    ) -> Result<IndexedImage> {
        let grid = self.decode_texture(index)?;
        let info = &self.textures[index];
        let palette = palette
            .map(|p| self.decode_palette(p, info.format))
            .transpose()?;
        Ok(render(&grid, palette.as_ref(), texture_options(info.color0, depth)))
    }

    /// Lay every texture out in one grid image sharing a single palette.
    ///
    /// `palette` defaults to the first palette when there is one.
    pub fn mosaic(&self, palette: Option<usize>) -> Result<Mosaic> {
        if self.textures.is_empty() {
            return Err(Error::MissingResource("texture"));
        }
        let order = order_by_suffix(
            &self.textures.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        );
        let lead = &self.textures[order[0]];
        let cell = lead.size();
        let (columns, rows) = grid_dimensions(order.len());

        let mut skipped = Vec::new();
        let grids: Vec<Option<PixelGrid>> = order
            .iter()
            .map(|&i| match self.decode_texture(i) {
                Ok(grid) => Some(grid),
                Err(e) => {
                    tracing::warn!(texture = %self.textures[i].name, error = %e, "mosaic cell skipped");
                    skipped.push(i);
                    None
                }
            })
            .collect();
        let cells: Vec<Option<&PixelGrid>> = grids.iter().map(Option::as_ref).collect();
        let grid = compose(&cells, columns, rows, cell);

        let palette = match palette {
            Some(index) => Some(self.decode_palette(index, lead.format)?),
            None if self.palettes.is_empty() => None,
            None => self
                .decode_palette(0, lead.format)
                .inspect_err(|e| tracing::warn!(error = %e, "mosaic rendered without palette"))
                .ok(),
        };

        Ok(Mosaic {
            columns,
            rows,
            cell,
            grid,
            palette,
            color0: lead.color0,
            order,
            skipped,
        })
    }
}

fn texture_options(color0: bool, depth: ChannelDepth) -> RenderOptions {
    RenderOptions {
        depth,
        transparent_zero: color0,
        ramp: GrayRamp::Descending,
    }
}

/// Read an info block header up to its first entry; returns the entry count.
fn read_info_header<R: Read>(r: &mut R, entry_size: u16) -> Result<usize> {
    let _dummy = u8(r)?;
    let count = u8(r)? as usize;
    let _section_size = le_u16(r)?;
    let _unknown_header = le_u16(r)?;
    let _unknown_size = le_u16(r)?;
    let _constant = le_u32(r)?;
    for _ in 0..count {
        let _unknown = le_u32(r)?;
    }
    if le_u16(r)? != entry_size {
        return Err(Error::Parse("unexpected info block entry size"));
    }
    let _entries_size = le_u16(r)?;
    Ok(count)
}

fn read_name<R: Read>(r: &mut R) -> Result<String> {
    Ok(padded_string(&bytesa::<NAME_SIZE>(r)?))
}

/// Textures composed into one grid. See [`Tex0::mosaic`].
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub columns: usize,
    pub rows: usize,
    /// Size of every cell (the size of the first texture in `order`).
    pub cell: Size,
    pub grid: PixelGrid,
    pub palette: Option<Palette>,
    pub color0: bool,
    /// Texture index placed in each cell, row-major.
    pub order: Vec<usize>,
    /// Textures that failed to decode; their cells stay index 0.
    pub skipped: Vec<usize>,
}

impl Mosaic {
    pub fn render(&self, depth: ChannelDepth) -> IndexedImage {
        render(&self.grid, self.palette.as_ref(), texture_options(self.color0, depth))
    }
}

/// A parsed texture container.
#[derive(Debug, Clone)]
pub struct Btx0<'a> {
    pub header: EnvelopeHeader,
    /// Offset of every block, from the start of the file.
    pub block_offsets: Vec<u32>,
    /// The TEX0 blocks, in block order.
    pub blocks: Vec<Tex0<'a>>,
}

impl<'a> Btx0<'a> {
    /// Parse a BTX0 or BMD0 file held in `buf`. Non-TEX0 blocks are skipped.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let header = EnvelopeHeader::parse(buf)?;
        if !is_texture_container(&header.magic) {
            return Err(Error::BadMagic { expected: b"BTX0" });
        }

        let mut r = Cursor::new(buf);
        r.seek(SeekFrom::Start(header.header_size as u64))?;
        let block_offsets = (0..header.record_count)
            .map(|_| le_u32(&mut r))
            .collect::<Result<Vec<_>>>()?;

        let mut blocks = Vec::new();
        for &offset in &block_offsets {
            let block = buf.get(offset as usize..).ok_or(Error::InvalidRange)?;
            if block.starts_with(b"TEX0") {
                blocks.push(Tex0::parse(block)?);
            } else {
                tracing::trace!(
                    offset,
                    magic = %String::from_utf8_lossy(&block[..block.len().min(4)]),
                    "skipping non-texture block"
                );
            }
        }

        tracing::debug!(blocks = blocks.len(), "parsed texture container");
        Ok(Self {
            header,
            block_offsets,
            blocks,
        })
    }

    /// The first TEX0 block.
    pub fn tex0(&self) -> Result<&Tex0<'a>> {
        self.blocks.first().ok_or(Error::MissingResource("TEX0 block"))
    }
}

pub(crate) fn is_texture_container(magic: &[u8]) -> bool {
    magic.starts_with(b"BTX0") || magic.starts_with(b"BMD0")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::formats::envelope::BOM_LE;
    use pretty_assertions::assert_eq;

    /// Texture parameters for an 8×8 texture of `format`.
    pub(crate) fn params(format: u16, color0: bool) -> u16 {
        (format << 10) | if color0 { 1 << 13 } else { 0 }
    }

    fn pad8(buf: &mut Vec<u8>) {
        while buf.len() % 8 != 0 {
            buf.push(0);
        }
    }

    fn name16(name: &str) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..name.len()].copy_from_slice(name.as_bytes());
        out
    }

    fn info_block(count: usize, entry_size: u16, entries: &[u8], names: &[&str]) -> Vec<u8> {
        let mut out = vec![0, count as u8];
        let size = 12 + 4 * count + 4 + entries.len() + 16 * count;
        out.extend((size as u16).to_le_bytes());
        out.extend(8u16.to_le_bytes());
        out.extend(((12 + 4 * count) as u16).to_le_bytes());
        out.extend(0x17Fu32.to_le_bytes());
        out.extend(vec![0u8; 4 * count]);
        out.extend(entry_size.to_le_bytes());
        out.extend(((4 + entries.len()) as u16).to_le_bytes());
        out.extend(entries);
        for n in names {
            out.extend(name16(n));
        }
        out
    }

    /// A TEX0 block from `(name, params, pixels)` textures and
    /// `(name, color bytes)` palettes.
    pub(crate) fn tex0(textures: &[(&str, u16, &[u8])], palettes: &[(&str, &[u8])]) -> Vec<u8> {
        let mut tex_entries = Vec::new();
        let mut tex_data = Vec::new();
        for (_, p, data) in textures {
            tex_entries.extend(((tex_data.len() / 8) as u16).to_le_bytes());
            tex_entries.extend(p.to_le_bytes());
            tex_entries.extend([0u8; 4]);
            tex_data.extend(*data);
            pad8(&mut tex_data);
        }
        let mut pal_entries = Vec::new();
        let mut pal_data = Vec::new();
        for (_, data) in palettes {
            pal_entries.extend(((pal_data.len() / 8) as u16).to_le_bytes());
            pal_entries.extend(0u16.to_le_bytes());
            pal_data.extend(*data);
            pad8(&mut pal_data);
        }
        let tex_names: Vec<&str> = textures.iter().map(|t| t.0).collect();
        let pal_names: Vec<&str> = palettes.iter().map(|p| p.0).collect();
        let tex_info = info_block(textures.len(), 8, &tex_entries, &tex_names);
        let pal_info = info_block(palettes.len(), 4, &pal_entries, &pal_names);

        let tex_info_off = 0x3C;
        let pal_info_off = tex_info_off + tex_info.len();
        let tex_data_off = pal_info_off + pal_info.len();
        let pal_data_off = tex_data_off + tex_data.len();
        let total = pal_data_off + pal_data.len();

        let mut out = Vec::new();
        out.extend(b"TEX0");
        out.extend((total as u32).to_le_bytes());
        out.extend([0u8; 4]);
        out.extend(((tex_data.len() / 8) as u16).to_le_bytes());
        out.extend((tex_info_off as u16).to_le_bytes());
        out.extend([0u8; 4]);
        out.extend((tex_data_off as u32).to_le_bytes());
        out.extend([0u8; 4]);
        out.extend([0u8; 0x10]);
        out.extend([0u8; 4]);
        out.extend(((pal_data.len() / 8) as u16).to_le_bytes());
        out.extend([0u8; 2]);
        out.extend((pal_info_off as u32).to_le_bytes());
        out.extend((pal_data_off as u32).to_le_bytes());
        out.extend(tex_info);
        out.extend(pal_info);
        out.extend(tex_data);
        out.extend(pal_data);
        out
    }

    /// A container with the given magic around `blocks`.
    pub(crate) fn container(magic: &[u8; 4], blocks: &[Vec<u8>]) -> Vec<u8> {
        let header_len = 0x10 + 4 * blocks.len();
        let total = header_len + blocks.iter().map(Vec::len).sum::<usize>();
        let mut out = Vec::new();
        out.extend(magic);
        out.extend(BOM_LE.to_le_bytes());
        out.extend(1u16.to_le_bytes());
        out.extend((total as u32).to_le_bytes());
        out.extend(0x10u16.to_le_bytes());
        out.extend((blocks.len() as u16).to_le_bytes());
        let mut offset = header_len;
        for b in blocks {
            out.extend((offset as u32).to_le_bytes());
            offset += b.len();
        }
        for b in blocks {
            out.extend(b);
        }
        out
    }

    fn filled(value: u8) -> Vec<u8> {
        vec![value | (value << 4); 32]
    }

    fn palette_words() -> Vec<u8> {
        let mut out = Vec::new();
        for i in 0..16u16 {
            out.extend((i * 0x0421).to_le_bytes());
        }
        out
    }

    #[test]
    fn definitions_and_payloads() {
        let pix = filled(1);
        let pal = palette_words();
        let file = container(
            b"BTX0",
            &[tex0(&[("wall", params(3, true), &pix)], &[("wall_pl", &pal)])],
        );
        let btx = Btx0::parse(&file).unwrap();
        let tex = btx.tex0().unwrap();

        assert_eq!(
            tex.textures[0],
            TextureInfo {
                name: "wall".into(),
                offset: 0,
                width: 8,
                height: 8,
                format: TextureFormat::PALETTE_16,
                color0: true,
            }
        );
        assert_eq!(tex.palettes[0].name, "wall_pl");
        assert_eq!(tex.texture_bytes(0).unwrap(), &pix[..]);
        assert_eq!(tex.find_texture("wall"), Some(0));
        assert_eq!(tex.find_palette("nope"), None);

        let palette = tex.decode_palette(0, TextureFormat::PALETTE_16).unwrap();
        assert_eq!(palette.len(), 16);

        let image = tex.render_texture(0, Some(0), ChannelDepth::Native5).unwrap();
        assert_eq!(image.pixel(0, 0), Some([1, 1, 1, 31]));
    }

    #[test]
    fn dimensions_come_from_size_classes() {
        // Width class 1 (16), height class 0 (8); row-major nibbles.
        let mut pix = vec![0u8; 64];
        pix[0] = 0x21;
        pix[8] = 0x03;
        let p = params(3, false) | (1 << 4);
        let file = container(b"BTX0", &[tex0(&[("wide", p, &pix)], &[])]);
        let btx = Btx0::parse(&file).unwrap();
        let tex = btx.tex0().unwrap();
        let grid = tex.decode_texture(0).unwrap();
        assert_eq!(grid.size(), Size::new(16, 8));
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(1, 0), Some(2));
        assert_eq!(grid.get(0, 1), Some(3));

        // Grayscale fallback runs from white to black.
        let image = tex.render_texture(0, None, ChannelDepth::Scaled8).unwrap();
        assert_eq!(image.pixel(2, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn unsupported_formats_do_not_affect_siblings() {
        let good = filled(2);
        let two_bit = vec![0u8; 16];
        let file = container(
            b"BTX0",
            &[tex0(
                &[("a_0", params(3, false), &good), ("a_1", params(2, false), &two_bit)],
                &[],
            )],
        );
        let btx = Btx0::parse(&file).unwrap();
        let tex = btx.tex0().unwrap();
        assert_eq!(tex.texture_bytes(1).unwrap().len(), 16);
        assert_eq!(TextureFormat(2).palette_len(), Some(4));
        assert_eq!(TextureFormat::PALETTE_16.palette_len(), Some(16));
        assert_eq!(TextureFormat(4).palette_len(), Some(16));
        assert_eq!(TextureFormat::DIRECT.palette_len(), None);
        assert_eq!(TextureFormat(0).palette_len(), None);
        assert!(matches!(
            tex.palette_bytes(0, TextureFormat::DIRECT),
            Err(Error::UnsupportedFormat { .. })
        ));

        let all = tex.decode_all();
        assert!(all[0].is_ok());
        assert_eq!(all[1].as_ref().unwrap_err().kind(), ErrorKind::Unsupported);

        let mosaic = tex.mosaic(None).unwrap();
        assert_eq!(mosaic.skipped, vec![1]);
        assert_eq!(mosaic.grid.get(0, 0), Some(2));
        assert_eq!(mosaic.grid.get(8, 0), Some(0));
    }

    #[test]
    fn eight_textures_form_a_four_by_two_mosaic() {
        let data: Vec<Vec<u8>> = (0..8).map(|i| filled(7 - i)).collect();
        let names: Vec<String> = (0..8).map(|i| format!("t_{}", 7 - i)).collect();
        let textures: Vec<(&str, u16, &[u8])> = names
            .iter()
            .zip(&data)
            .map(|(n, d)| (n.as_str(), params(3, false), d.as_slice()))
            .collect();
        let pal = palette_words();
        let file = container(b"BTX0", &[tex0(&textures, &[("pl", &pal)])]);

        let btx = Btx0::parse(&file).unwrap();
        let mosaic = btx.tex0().unwrap().mosaic(None).unwrap();
        assert_eq!((mosaic.columns, mosaic.rows), (4, 2));
        assert_eq!(mosaic.grid.size(), Size::new(32, 16));
        assert_eq!(mosaic.order, vec![7, 6, 5, 4, 3, 2, 1, 0]);
        // Cell `s` holds the texture with suffix `s`.
        for s in 0..8 {
            let (x, y) = ((s % 4) * 8, (s / 4) * 8);
            assert_eq!(mosaic.grid.get(x + 3, y + 3), Some(s as u8));
        }
        assert!(mosaic.palette.is_some());
        assert_eq!(mosaic.render(ChannelDepth::Scaled8).width, 32);
    }

    #[test]
    fn model_files_skip_other_blocks() {
        let mut mdl0 = b"MDL0".to_vec();
        mdl0.extend(8u32.to_le_bytes());
        let pix = filled(4);
        let file = container(
            b"BMD0",
            &[mdl0, tex0(&[("m", params(3, false), &pix)], &[])],
        );
        let btx = Btx0::parse(&file).unwrap();
        assert_eq!(btx.block_offsets.len(), 2);
        assert_eq!(btx.blocks.len(), 1);
        assert_eq!(btx.tex0().unwrap().textures[0].name, "m");
    }

    #[test]
    fn structural_errors() {
        let file = container(b"NARC", &[]);
        assert!(matches!(Btx0::parse(&file), Err(Error::BadMagic { .. })));

        let empty = container(b"BTX0", &[]);
        let btx = Btx0::parse(&empty).unwrap();
        assert!(matches!(btx.tex0(), Err(Error::MissingResource(_))));

        let mut truncated = container(b"BTX0", &[tex0(&[], &[])]);
        truncated.truncate(truncated.len() - 4);
        assert!(matches!(Btx0::parse(&truncated), Err(Error::InvalidRange)));
    }
}
