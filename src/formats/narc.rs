//! NARC (Nitro ARChive) - general-purpose bundle of small files.
//!
//! Used pervasively in DS game content to pack hundreds of assets (text
//! banks, sprites, palettes, textures) behind a single ROM file entry.
//!
//! ## Layout
//! ```text
//! [0x00] Envelope header "NARC"  (0x10 bytes, 3 records)
//! [0x10] BTAF record             - allocation table
//! [...]  BTNF record             - file name table
//! [...]  GMIF record             - concatenated file data
//! ```
//!
//! ## BTAF payload
//! ```text
//! [0x00] FileCount               (u16 LE)
//! [0x02] Reserved                (u16)
//! [0x04] Entries (FileCount × 8)
//!        [0x00] Start            (u32 LE) - relative to the GMIF payload
//!        [0x04] End              (u32 LE) - exclusive
//! ```
//!
//! ## BTNF payload
//! Same structure as the ROM file name table (see [`crate::formats::fnt`]).
//! Most archives carry only an empty root directory, so files are addressed
//! by index.

use std::io::Cursor;

use super::envelope::Envelope;
use super::fnt::{self, FileNames};
use crate::utils::{le_u16, le_u32};
use crate::{Error, Result};

/// Parsed NARC archive, borrowing from the source buffer.
#[derive(Debug, Clone)]
pub struct Narc<'a> {
    /// `(start, end)` of every file, relative to the data region.
    pub ranges: Vec<(u32, u32)>,
    /// Raw BTNF payload.
    pub name_table: &'a [u8],
    data: &'a [u8],
}

impl<'a> Narc<'a> {
    /// Parse a NARC archive held in `buf`.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let env = Envelope::parse_expecting(buf, b"NARC")?;
        let [fat, names, data] = env.records.as_slice() else {
            return Err(Error::Parse("NARC must contain exactly three records"));
        };
        fat.expect(b"BTAF")?;
        names.expect(b"BTNF")?;
        data.expect(b"GMIF")?;

        let mut r = Cursor::new(fat.payload);
        let count = le_u16(&mut r)?;
        let _reserved = le_u16(&mut r)?;
        let mut ranges = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let start = le_u32(&mut r)?;
            let end = le_u32(&mut r)?;
            if start > end || end as usize > data.payload.len() {
                return Err(Error::InvalidRange);
            }
            ranges.push((start, end));
        }

        tracing::debug!(files = count, "parsed NARC");
        Ok(Self {
            ranges,
            name_table: names.payload,
            data: data.payload,
        })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Contents of file `index`.
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        let &(start, end) = self.ranges.get(index)?;
        self.data.get(start as usize..end as usize)
    }

    /// Iterate over every file's contents in table order.
    pub fn files(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        let data = self.data;
        self.ranges
            .iter()
            .map(move |&(start, end)| &data[start as usize..end as usize])
    }

    /// Resolve the name table. Files without a name stay [`None`].
    pub fn names(&self) -> Result<FileNames> {
        fnt::resolve(self.name_table, self.len())
    }
}

/// Split a NARC archive into its files.
pub fn split(buf: &[u8]) -> Result<Vec<&[u8]>> {
    Ok(Narc::parse(buf)?.files().collect())
}

/// Whether `buf` parses as a NARC archive. Never fails.
pub fn is_narc(buf: &[u8]) -> bool {
    Narc::parse(buf).is_ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::formats::envelope::tests::build as envelope;
    use crate::formats::fnt::tests::{Name, build as fnt};
    use pretty_assertions::assert_eq;

    /// Build a NARC whose files are `files`, with an empty name table.
    pub(crate) fn build(files: &[&[u8]]) -> Vec<u8> {
        build_named(files, &fnt(&[(0, 0, vec![])]))
    }

    pub(crate) fn build_named(files: &[&[u8]], names: &[u8]) -> Vec<u8> {
        let mut fat = Vec::new();
        fat.extend((files.len() as u16).to_le_bytes());
        fat.extend(0u16.to_le_bytes());
        let mut data = Vec::new();
        for f in files {
            let start = data.len() as u32;
            data.extend(*f);
            fat.extend(start.to_le_bytes());
            fat.extend((data.len() as u32).to_le_bytes());
            // Real archives pad entries to four bytes.
            while data.len() % 4 != 0 {
                data.push(0xFF);
            }
        }
        envelope(b"NARC", &[(b"BTAF", &fat), (b"BTNF", names), (b"GMIF", &data)])
    }

    #[test]
    fn splits_into_exact_slices() {
        let files: [&[u8]; 3] = [b"first", b"", b"third file"];
        let narc = build(&files);
        assert!(is_narc(&narc));
        let chunks = split(&narc).unwrap();
        assert_eq!(chunks, files.to_vec());

        let parsed = Narc::parse(&narc).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.get(2), Some(&b"third file"[..]));
        assert_eq!(parsed.get(3), None);
        assert_eq!(parsed.names().unwrap().paths, vec![None, None, None]);
    }

    #[test]
    fn names_resolve_through_the_name_table() {
        let names = fnt(&[(0, 0, vec![Name::File("a.bin"), Name::File("b.bin")])]);
        let narc = build_named(&[b"A", b"B"], &names);
        let resolved = Narc::parse(&narc).unwrap().names().unwrap();
        assert_eq!(
            resolved.paths,
            vec![Some("/a.bin".to_string()), Some("/b.bin".to_string())]
        );
    }

    #[test]
    fn rejects_malformed_archives() {
        assert!(!is_narc(b"NARC"));
        assert!(!is_narc(&envelope(b"RLCN", &[])));

        let two_records = envelope(b"NARC", &[(b"BTAF", &[0, 0, 0, 0]), (b"BTNF", &[])]);
        assert!(matches!(Narc::parse(&two_records), Err(Error::Parse(_))));

        let swapped = envelope(
            b"NARC",
            &[(b"BTNF", &[]), (b"BTAF", &[0, 0, 0, 0]), (b"GMIF", &[])],
        );
        assert!(matches!(Narc::parse(&swapped), Err(Error::BadMagic { .. })));

        let mut fat = vec![1, 0, 0, 0];
        fat.extend(0u32.to_le_bytes());
        fat.extend(9u32.to_le_bytes());
        let overlong = envelope(b"NARC", &[(b"BTAF", &fat), (b"BTNF", &[]), (b"GMIF", b"short")]);
        assert!(matches!(Narc::parse(&overlong), Err(Error::InvalidRange)));
    }
}
