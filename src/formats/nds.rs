//! NDS - Nintendo DS ROM image.
//!
//! ## Layout
//! ```text
//! [0x0000] Header                     (0x200 bytes)
//! [...]    ARM9 / ARM7 binaries and overlays
//! [FntOffset]    File name table      (see [`crate::formats::fnt`])
//! [FatOffset]    File allocation table
//! [BannerOffset] Banner               (see [`crate::formats::banner`])
//! [...]    File data
//! ```
//!
//! ## Header (selected fields)
//! ```text
//! [0x000] GameTitle                   (12 bytes, ASCII)
//! [0x00C] GameCode                    (4 bytes)
//! [0x010] MakerCode                   (u16 LE)
//! [0x012] UnitCode                    (u8)
//! [0x013] DeviceCode                  (u8)
//! [0x014] CardSize                    (u8)
//! [0x015] Reserved                    (10 bytes)
//! [0x01F] Flags                       (u8)
//! [0x020] ARM9 source/entry/load/len  (4 × u32 LE)
//! [0x030] ARM7 source/entry/load/len  (4 × u32 LE)
//! [0x040] FntOffset, FntLength        (2 × u32 LE)
//! [0x048] FatOffset, FatLength        (2 × u32 LE)
//! [0x050] ARM9 overlay offset/length  (2 × u32 LE)
//! [0x058] ARM7 overlay offset/length  (2 × u32 LE)
//! [0x060] Register read/init flags    (2 × u32 LE)
//! [0x068] BannerOffset                (u32 LE) - 0 when absent
//! [0x06C] SecureAreaCrc, RomTimeout   (2 × u16 LE)
//! [0x070] ARM9/ARM7 autoload          (2 × u32 LE)
//! [0x078] SecureAreaDisable           (u64 LE)
//! [0x080] RomLength, HeaderLength     (2 × u32 LE)
//! [0x088] Reserved                    (0x38 bytes)
//! [0x0C0] Nintendo logo               (0x9C bytes)
//! [0x15C] LogoCrc, HeaderCrc          (2 × u16 LE)
//! [0x160] Reserved                    (0xA0 bytes)
//! ```
//!
//! ## File allocation table
//! A headerless run of `(start: u32, end: u32)` pairs, one per file id;
//! `FatLength / 8` entries.

use std::fmt;
use std::io::{Read, Seek, SeekFrom, Take};
use std::ops::Index;

use super::banner::Banner;
use super::fnt;
use crate::utils::{bytesa, bytesv, le_u16, le_u32, le_u64, padded_string, u8};
use crate::{Error, Result};

const FAT_RECORD_SIZE: usize = 8;

/// A byte range within the ROM image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteRange {
    pub offset: u32,
    pub length: u32,
}

impl ByteRange {
    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.length as u64
    }
}

/// Load description of one CPU binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binary {
    /// Offset of the binary in the ROM image.
    pub source: u32,
    pub entry_address: u32,
    pub load_address: u32,
    pub length: u32,
}

/// The fixed ROM header. Fields the catalog does not need are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RomHeader {
    pub title: String,
    pub game_code: String,
    pub maker_code: u16,
    pub unit_code: u8,
    pub device_code: u8,
    pub card_size: u8,
    pub flags: u8,
    pub arm9: Binary,
    pub arm7: Binary,
    pub file_table_offset: u32,
    pub file_table_length: u32,
    pub fat_offset: u32,
    pub fat_length: u32,
    pub arm9_overlays: ByteRange,
    pub arm7_overlays: ByteRange,
    pub register_read_flags: u32,
    pub register_init_flags: u32,
    pub banner_offset: u32,
    pub secure_area_crc: u16,
    pub rom_timeout: u16,
    pub arm9_autoload: u32,
    pub arm7_autoload: u32,
    pub secure_area_disable: u64,
    pub rom_length: u32,
    pub header_length: u32,
    pub logo_crc: u16,
    pub header_crc: u16,
}

impl RomHeader {
    pub const SIZE: usize = 0x200;

    /// Parse the header from `r`, positioned at the start of the image.
    pub fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let title = padded_string(&bytesa::<12>(r)?);
        let game_code = padded_string(&bytesa::<4>(r)?);
        let maker_code = le_u16(r)?;
        let unit_code = u8(r)?;
        let device_code = u8(r)?;
        let card_size = u8(r)?;
        let _reserved = bytesa::<10>(r)?;
        let flags = u8(r)?;
        let arm9 = read_binary(r)?;
        let arm7 = read_binary(r)?;
        let file_table_offset = le_u32(r)?;
        let file_table_length = le_u32(r)?;
        let fat_offset = le_u32(r)?;
        let fat_length = le_u32(r)?;
        let arm9_overlays = read_range(r)?;
        let arm7_overlays = read_range(r)?;
        let register_read_flags = le_u32(r)?;
        let register_init_flags = le_u32(r)?;
        let banner_offset = le_u32(r)?;
        let secure_area_crc = le_u16(r)?;
        let rom_timeout = le_u16(r)?;
        let arm9_autoload = le_u32(r)?;
        let arm7_autoload = le_u32(r)?;
        let secure_area_disable = le_u64(r)?;
        let rom_length = le_u32(r)?;
        let header_length = le_u32(r)?;
        let _reserved = bytesa::<0x38>(r)?;
        let _logo = bytesa::<0x9C>(r)?;
        let logo_crc = le_u16(r)?;
        let header_crc = le_u16(r)?;
        let _reserved = bytesa::<0xA0>(r)?;

        Ok(Self {
            title,
            game_code,
            maker_code,
            unit_code,
            device_code,
            card_size,
            flags,
            arm9,
            arm7,
            file_table_offset,
            file_table_length,
            fat_offset,
            fat_length,
            arm9_overlays,
            arm7_overlays,
            register_read_flags,
            register_init_flags,
            banner_offset,
            secure_area_crc,
            rom_timeout,
            arm9_autoload,
            arm7_autoload,
            secure_area_disable,
            rom_length,
            header_length,
            logo_crc,
            header_crc,
        })
    }
}

fn read_binary<R: Read>(r: &mut R) -> Result<Binary> {
    Ok(Binary {
        source: le_u32(r)?,
        entry_address: le_u32(r)?,
        load_address: le_u32(r)?,
        length: le_u32(r)?,
    })
}

fn read_range<R: Read>(r: &mut R) -> Result<ByteRange> {
    Ok(ByteRange {
        offset: le_u32(r)?,
        length: le_u32(r)?,
    })
}

/// A single file of the ROM image.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    /// Index of the file's allocation table record.
    pub id: u16,
    /// Full path (`/dir/name`), [`None`] when the name table never names it.
    pub path: Option<String>,
    pub range: ByteRange,
}

/// Parsed ROM image (metadata only).
///
/// File data is fetched on demand through [`Catalog::fetch`] or
/// [`CatalogReader`].
#[derive(Debug, Clone)]
pub struct Catalog {
    pub header: RomHeader,
    /// [`None`] when the header has no banner offset.
    pub banner: Option<Banner>,
    /// Every file, in allocation table order.
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parse the header, banner, allocation table and name table.
    pub fn parse<R: Read + Seek>(r: &mut R) -> Result<Self> {
        r.seek(SeekFrom::Start(0))?;
        let header = RomHeader::parse(r)?;

        let banner = if header.banner_offset == 0 {
            None
        } else {
            r.seek(SeekFrom::Start(header.banner_offset as u64))?;
            Some(Banner::parse(r)?)
        };

        r.seek(SeekFrom::Start(header.fat_offset as u64))?;
        let fat = bytesv(r, header.fat_length as usize)?;
        if fat.len() % FAT_RECORD_SIZE != 0 {
            return Err(Error::Parse("allocation table length is not a multiple of 8"));
        }
        let mut entries = Vec::with_capacity(fat.len() / FAT_RECORD_SIZE);
        for (id, rec) in fat.chunks_exact(FAT_RECORD_SIZE).enumerate() {
            let start = u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]);
            let end = u32::from_le_bytes([rec[4], rec[5], rec[6], rec[7]]);
            if end < start {
                return Err(Error::Parse("allocation record ends before it starts"));
            }
            let id = u16::try_from(id).map_err(|_| Error::Parse("too many allocation records"))?;
            entries.push(CatalogEntry {
                id,
                path: None,
                range: ByteRange {
                    offset: start,
                    length: end - start,
                },
            });
        }

        r.seek(SeekFrom::Start(header.file_table_offset as u64))?;
        let fnt = bytesv(r, header.file_table_length as usize)?;
        let names = fnt::resolve(&fnt, entries.len())?;
        for (entry, path) in entries.iter_mut().zip(names.paths) {
            entry.path = path;
        }

        tracing::debug!(
            title = %header.title,
            game_code = %header.game_code,
            files = entries.len(),
            "parsed ROM catalog"
        );
        Ok(Self {
            header,
            banner,
            entries,
        })
    }

    /// Entry with allocation id `id`.
    pub fn get(&self, id: u16) -> Option<&CatalogEntry> {
        self.entries.get(id as usize)
    }

    /// Entry whose path is exactly `path`.
    ///
    /// Returns [`Error::AmbiguousLookup`] if several entries share the path.
    pub fn find_by_path(&self, path: &str) -> Result<Option<&CatalogEntry>> {
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.path.as_deref() == Some(path));
        let first = matches.next();
        let extra = matches.count();
        if extra > 0 {
            return Err(Error::AmbiguousLookup {
                path: path.to_string(),
                matches: extra + 1,
            });
        }
        Ok(first)
    }

    /// Read the contents of `entry` from `r`.
    ///
    /// `r` must be the stream the catalog was parsed from.
    pub fn fetch<R: Read + Seek>(&self, r: &mut R, entry: &CatalogEntry) -> Result<Vec<u8>> {
        r.seek(SeekFrom::Start(entry.range.offset as u64))?;
        bytesv(r, entry.range.length as usize)
    }

    /// Listing lines: a directory header whenever the parent directory
    /// changes, followed by one line per entry.
    pub fn listing(&self) -> Vec<ListingLine<'_>> {
        let mut lines = Vec::with_capacity(self.entries.len());
        let mut current: Option<&str> = None;
        for entry in &self.entries {
            if let Some(path) = &entry.path {
                let dir = path.rsplit_once('/').map_or("", |(dir, _)| dir);
                if current != Some(dir) {
                    lines.push(ListingLine::Directory(dir));
                    current = Some(dir);
                }
            }
            lines.push(ListingLine::Entry(entry));
        }
        lines
    }
}

/// One line of [`Catalog::listing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingLine<'a> {
    /// Directory header, e.g. `/a`. Root files sit under `""`.
    Directory(&'a str),
    Entry(&'a CatalogEntry),
}

impl fmt::Display for ListingLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingLine::Directory(dir) => f.write_str(dir),
            ListingLine::Entry(e) => write!(
                f,
                "{:5} 0x{:08x} 0x{:08x} {:9} {}",
                e.id,
                e.range.offset,
                e.range.end(),
                e.range.length,
                e.path.as_deref().unwrap_or("(no filename)")
            ),
        }
    }
}

/// Streaming reader wrapper over a parsed [`Catalog`].
pub struct CatalogReader<R> {
    inner: R,
    /// Parsed metadata.
    pub catalog: Catalog,
}

impl<R: Read + Seek> CatalogReader<R> {
    /// Parse a ROM image and wrap the provided reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let catalog = Catalog::parse(&mut reader)?;
        Ok(Self {
            inner: reader,
            catalog,
        })
    }

    /// Open a file for streaming access.
    ///
    /// Seeks to the file's start and returns a [`Take`] limited to its byte
    /// range. The borrow ends when the [`Take`] is dropped.
    pub fn read_file(&mut self, entry: &CatalogEntry) -> Result<Take<&mut R>> {
        self.inner
            .seek(SeekFrom::Start(entry.range.offset as u64))?;
        Ok(self.inner.by_ref().take(entry.range.length as u64))
    }

    /// Read the whole contents of `entry`.
    pub fn fetch(&mut self, entry: &CatalogEntry) -> Result<Vec<u8>> {
        self.catalog.fetch(&mut self.inner, entry)
    }

    /// Iterate over all entries.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.catalog.entries.iter()
    }

    /// Entry with allocation id `id`.
    pub fn get(&self, id: u16) -> Option<&CatalogEntry> {
        self.catalog.get(id)
    }

    /// Find an entry by path. See [`Catalog::find_by_path`].
    pub fn find_by_path(&self, path: &str) -> Result<Option<&CatalogEntry>> {
        self.catalog.find_by_path(path)
    }

    /// Consume the reader, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Index<&str> for CatalogReader<R> {
    type Output = CatalogEntry;

    /// Index by path.
    ///
    /// # Panics
    /// Panics if no entry, or more than one, has this path.
    fn index(&self, index: &str) -> &Self::Output {
        match self.find_by_path(index) {
            Ok(Some(entry)) => entry,
            Ok(None) => panic!("no file '{index}' in ROM"),
            Err(e) => panic!("{e}"),
        }
    }
}
