//! Encrypted multi-string text blocks.
//!
//! ## Layout
//! ```text
//! [0x00] Count                     (u16 LE)
//! [0x02] Key                       (u16 LE)
//! [0x04] Records (Count × 8 bytes) - masked
//!        [0x00] Offset (u32 LE)    - from block start
//!        [0x04] Length (u32 LE)    - in 16-bit code units
//! [...]  String data               - masked 16-bit code units
//! ```
//!
//! ## Header mask
//! ```text
//! base     = key * 0x02FD                  (mod 2^16)
//! k16[i]   = base * (i + 1)                (mod 2^16)
//! record i ^= k16[i] | k16[i] << 16        (both fields)
//! ```
//!
//! ## String mask
//! The key for string `i` starts at `(i + 1) * 0x91BD3 (mod 2^16)` and grows
//! by `0x493D` after every code unit.

use std::borrow::Cow;
use std::io::Cursor;

use crate::charmap::CharacterTable;
use crate::utils::{le_u16, le_u16_at, le_u32};
use crate::{Error, Result};

const HEADER_KEY_MULTIPLIER: u16 = 0x02FD;
const STRING_KEY_MULTIPLIER: u32 = 0x91BD3;
const STRING_KEY_STEP: u16 = 0x493D;

/// Code units below this value are control codes and never go through the
/// character table.
const FIRST_PRINTABLE: u16 = 32;

/// What to emit for a code unit that the table cannot translate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unmapped {
    /// `\uXXXX` with four lowercase hex digits.
    #[default]
    Escape,
    /// The code unit reinterpreted as a Unicode scalar (U+FFFD if it is a
    /// surrogate).
    Literal,
}

/// One unmasked header record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRecord {
    /// Byte offset of the string from the start of the block.
    pub offset: u32,
    /// Length in 16-bit code units.
    pub length: u32,
}

/// A parsed text block with its header already unmasked.
#[derive(Debug)]
pub struct TextBlock<'a> {
    /// Key stored in the block header.
    pub key: u16,
    /// Unmasked records, in header order.
    pub records: Vec<TextRecord>,
    data: &'a [u8],
}

impl<'a> TextBlock<'a> {
    /// Parse and unmask the header of `data`.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut r = Cursor::new(data);
        let count = le_u16(&mut r)?;
        let key = le_u16(&mut r)?;

        let base = key.wrapping_mul(HEADER_KEY_MULTIPLIER);
        let mut records = Vec::with_capacity(count as usize);
        for i in 0..count {
            let k16 = base.wrapping_mul(i.wrapping_add(1));
            let k32 = u32::from(k16) | u32::from(k16) << 16;
            let offset = le_u32(&mut r)? ^ k32;
            let length = le_u32(&mut r)? ^ k32;
            records.push(TextRecord { offset, length });
        }

        tracing::trace!(count, key, "unmasked text header");
        Ok(Self { key, records, data })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unmasked code units of string `index`.
    pub fn units(&self, index: usize) -> Result<Vec<u16>> {
        let record = self.records.get(index).ok_or(Error::InvalidRange)?;
        let base = record.offset as usize;
        let len = record.length as usize;
        if base
            .checked_add(len.checked_mul(2).ok_or(Error::InvalidRange)?)
            .is_none_or(|end| end > self.data.len())
        {
            return Err(Error::InvalidRange);
        }

        let mut key = string_key(index);
        let mut units = Vec::with_capacity(len);
        for p in 0..len {
            units.push(le_u16_at(self.data, base + 2 * p)? ^ key);
            key = key.wrapping_add(STRING_KEY_STEP);
        }
        Ok(units)
    }

    /// Every string, translated through `table`.
    pub fn decode(&self, table: &CharacterTable, policy: Unmapped) -> Result<Vec<String>> {
        (0..self.len())
            .map(|i| Ok(translate(&self.units(i)?, table, policy)))
            .collect()
    }
}

/// Starting key of string `index`.
fn string_key(index: usize) -> u16 {
    ((index as u32 + 1).wrapping_mul(STRING_KEY_MULTIPLIER) & 0xFFFF) as u16
}

/// Translate unmasked code units into a string.
pub fn translate(units: &[u16], table: &CharacterTable, policy: Unmapped) -> String {
    let mut out = String::with_capacity(units.len());
    for &unit in units {
        match table.get(unit) {
            Some(s) if unit >= FIRST_PRINTABLE => out.push_str(s),
            _ => match policy {
                Unmapped::Escape => out.push_str(&format!("\\u{unit:04x}")),
                Unmapped::Literal => {
                    out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER))
                }
            },
        }
    }
    out
}

/// Unmask every string of `data` into raw code units.
pub fn decrypt_units(data: &[u8]) -> Result<Vec<Vec<u16>>> {
    let block = TextBlock::parse(data)?;
    (0..block.len()).map(|i| block.units(i)).collect()
}

/// Unmask and translate every string of `data`.
pub fn decode(data: &[u8], table: &CharacterTable, policy: Unmapped) -> Result<Vec<String>> {
    TextBlock::parse(data)?.decode(table, policy)
}

/// Replace CR, LF, FF and TAB with two-character escapes for display.
pub fn escape_control(s: &str) -> Cow<'_, str> {
    if !s.contains(['\r', '\n', '\x0C', '\t']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\x0C' => out.push_str("\\f"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
