//! Nitro envelope - the block framing shared by most DS resource files.
//!
//! ## Header (0x10 bytes)
//! ```text
//! [0x00] Magic                  (4 bytes, e.g. "NARC", "RLCN", "RGCN")
//! [0x04] BOM (0xFEFF)           (u16 LE)
//! [0x06] Version                (u16 LE)
//! [0x08] TotalSize              (u32 LE)
//! [0x0C] HeaderSize (0x10)      (u16 LE)
//! [0x0E] RecordCount            (u16 LE)
//! ```
//!
//! ## Record
//! ```text
//! [0x00] Magic                  (4 bytes)
//! [0x04] Length                 (u32 LE) - includes these 8 bytes
//! [0x08] Payload                (Length - 8 bytes)
//! ```
//!
//! Records follow the header back to back. Texture containers replace the
//! sequential records with a table of block offsets; they reuse
//! [`EnvelopeHeader`] only.

use std::io::{Cursor, Seek, SeekFrom};

use crate::utils::{bytesa, le_u16, le_u32, range};
use crate::{Error, Result};

/// Byte order mark of little-endian Nitro files.
pub const BOM_LE: u16 = 0xFEFF;

const RECORD_HEADER_SIZE: u32 = 8;

/// The fixed 0x10-byte envelope header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub magic: [u8; 4],
    pub version: u16,
    /// Declared size of the whole file.
    pub total_size: u32,
    /// Offset of the first record.
    pub header_size: u16,
    /// Number of records (or blocks) that follow.
    pub record_count: u16,
}

impl EnvelopeHeader {
    pub const SIZE: usize = 0x10;

    /// Parse the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(data);
        let magic = bytesa::<4>(&mut r)?;
        let bom = le_u16(&mut r)?;
        if bom != BOM_LE {
            return Err(Error::Parse("unsupported byte order mark"));
        }
        let version = le_u16(&mut r)?;
        let total_size = le_u32(&mut r)?;
        let header_size = le_u16(&mut r)?;
        let record_count = le_u16(&mut r)?;

        if (header_size as usize) < Self::SIZE {
            return Err(Error::Parse("envelope header size too small"));
        }
        if total_size as usize != data.len() {
            tracing::debug!(
                declared = total_size,
                actual = data.len(),
                "envelope size differs from buffer"
            );
        }

        Ok(Self {
            magic,
            version,
            total_size,
            header_size,
            record_count,
        })
    }

    /// Fail with [`Error::BadMagic`] unless the magic is `expected`.
    pub fn expect(&self, expected: &'static [u8; 4]) -> Result<()> {
        if &self.magic != expected {
            return Err(Error::BadMagic { expected });
        }
        Ok(())
    }
}

/// One tagged record inside an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub magic: [u8; 4],
    /// Offset of the record header within the envelope.
    pub offset: usize,
    pub payload: &'a [u8],
}

impl Record<'_> {
    /// Fail with [`Error::BadMagic`] unless the magic is `expected`.
    pub fn expect(&self, expected: &'static [u8; 4]) -> Result<()> {
        if &self.magic != expected {
            return Err(Error::BadMagic { expected });
        }
        Ok(())
    }
}

/// A parsed envelope borrowing its records from the source buffer.
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    pub header: EnvelopeHeader,
    pub records: Vec<Record<'a>>,
}

impl<'a> Envelope<'a> {
    /// Parse the header and every record of `data`.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = EnvelopeHeader::parse(data)?;

        let mut r = Cursor::new(data);
        r.seek(SeekFrom::Start(header.header_size as u64))?;
        let mut records = Vec::with_capacity(header.record_count as usize);
        for _ in 0..header.record_count {
            let offset = r.position() as usize;
            let magic = bytesa::<4>(&mut r)?;
            let length = le_u32(&mut r)?;
            if length < RECORD_HEADER_SIZE {
                return Err(Error::Parse("record shorter than its header"));
            }
            let payload_len = (length - RECORD_HEADER_SIZE) as usize;
            let payload = range(data, offset + RECORD_HEADER_SIZE as usize, payload_len)?;
            r.seek(SeekFrom::Current(payload_len as i64))?;
            records.push(Record {
                magic,
                offset,
                payload,
            });
        }

        Ok(Self { header, records })
    }

    /// Parse `data` and require the envelope magic to be `expected`.
    pub fn parse_expecting(data: &'a [u8], expected: &'static [u8; 4]) -> Result<Self> {
        let env = Self::parse(data)?;
        env.header.expect(expected)?;
        Ok(env)
    }

    /// First record, which must carry the magic `expected`.
    pub fn first(&self, expected: &'static [u8; 4]) -> Result<&Record<'a>> {
        let record = self.records.first().ok_or(Error::Parse("envelope has no records"))?;
        record.expect(expected)?;
        Ok(record)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an envelope around `records`.
    pub(crate) fn build(magic: &[u8; 4], records: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let body_len: usize = records.iter().map(|(_, p)| 8 + p.len()).sum();
        let mut out = Vec::new();
        out.extend(magic);
        out.extend(BOM_LE.to_le_bytes());
        out.extend(0x0100u16.to_le_bytes());
        out.extend(((EnvelopeHeader::SIZE + body_len) as u32).to_le_bytes());
        out.extend((EnvelopeHeader::SIZE as u16).to_le_bytes());
        out.extend((records.len() as u16).to_le_bytes());
        for (m, p) in records {
            out.extend(*m);
            out.extend(((p.len() + 8) as u32).to_le_bytes());
            out.extend(*p);
        }
        out
    }

    #[test]
    fn records_are_split_in_order() {
        let data = build(b"TEST", &[(b"AAAA", b"one"), (b"BBBB", b"")]);
        let env = Envelope::parse_expecting(&data, b"TEST").unwrap();
        assert_eq!(env.header.record_count, 2);
        assert_eq!(env.records[0].magic, *b"AAAA");
        assert_eq!(env.records[0].payload, b"one");
        assert_eq!(env.records[0].offset, 0x10);
        assert_eq!(env.records[1].payload, b"");
        assert_eq!(env.records[1].offset, 0x10 + 11);
    }

    #[test]
    fn structural_errors() {
        let data = build(b"TEST", &[(b"AAAA", b"one")]);
        assert!(matches!(
            Envelope::parse_expecting(&data, b"NARC"),
            Err(Error::BadMagic { .. })
        ));

        let mut big_endian = data.clone();
        big_endian[4..6].copy_from_slice(&[0xFE, 0xFF]);
        assert!(matches!(Envelope::parse(&big_endian), Err(Error::Parse(_))));

        let truncated = &data[..data.len() - 1];
        assert!(matches!(Envelope::parse(truncated), Err(Error::InvalidRange)));

        let mut short_record = data.clone();
        short_record[0x14..0x18].copy_from_slice(&4u32.to_le_bytes());
        assert!(matches!(Envelope::parse(&short_record), Err(Error::Parse(_))));
    }
}
