//! Character tables for game text.
//!
//! Games store text as 16-bit code units in their own encoding. A character
//! table maps each code unit to the text it stands for.
//!
//! ## Table file format
//! One mapping per line, `HEXCODE=value`:
//!
//! ```text
//! 0121=A
//! 01DE=
//! E000=\n
//! 25BC=\x2469
//! ```
//!
//! `value` is taken verbatim (a space is a valid value) except for the
//! escapes `\n`, `\r`, `\f` and `\xHHHH`. Blank lines and lines starting with
//! `;` or `#` are ignored, as are lines whose code is not valid hex.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

use crate::{Error, Result};

/// Mapping from 16-bit code unit to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterTable {
    map: HashMap<u16, String>,
}

impl CharacterTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        for line in BufReader::new(reader).lines() {
            let line = line.map_err(Error::Io)?;
            table.load_line(&line);
        }
        tracing::debug!(entries = table.len(), "loaded character table");
        Ok(table)
    }

    /// Load a table from text already in memory.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    fn load_line(&mut self, line: &str) {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.starts_with([';', '#']) {
            return;
        }
        let Some((code, value)) = line.split_once('=') else {
            return;
        };
        if let Ok(code) = u16::from_str_radix(code.trim(), 16)
            && let Some(value) = unescape(value)
        {
            self.map.insert(code, value);
        } else {
            tracing::trace!(line, "skipping malformed character table line");
        }
    }

    /// Add or replace a mapping.
    pub fn insert(&mut self, code: u16, value: impl Into<String>) {
        self.map.insert(code, value.into());
    }

    /// Text for `code`, if mapped.
    pub fn get(&self, code: u16) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn unescape(value: &str) -> Option<String> {
    match value {
        "\\n" => Some("\n".into()),
        "\\r" => Some("\r".into()),
        "\\f" => Some("\x0C".into()),
        v => match v.strip_prefix("\\x") {
            Some(hex) => {
                let code = u32::from_str_radix(hex.get(..4)?, 16).ok()?;
                char::from_u32(code).map(String::from)
            }
            None => Some(v.to_string()),
        },
    }
}
