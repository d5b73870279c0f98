//! File name table - a directory tree flattened into a linear table.
//!
//! Shared by the ROM image and by archive name records.
//!
//! ## Layout
//! ```text
//! [0x00] Directory rows (DirectoryCount × 8 bytes)
//!        [0x00] NameListOffset  (u32 LE) - relative to the table start
//!        [0x04] TopFileId       (u16 LE) - id of the first file in the list
//!        [0x06] ParentId        (u16 LE) - for row 0: DirectoryCount
//! [...]  Name lists, each terminated by a zero byte
//! ```
//!
//! ## Name list entry
//! ```text
//! [0x00] Flags/Length  (u8)  - bit 7 = directory, bits 0-6 = name length
//! [0x01] Name          (Length bytes)
//! [...]  DirectoryId   (u16 LE, directories only; low 12 bits are the row)
//! ```
//!
//! Row `n` describes directory id `n`; the root is row 0. A directory's name
//! always appears in an earlier row's list than the directory's own row,
//! which is what lets the tree be rebuilt in a single pass.

use std::collections::BTreeMap;
use std::io::{Cursor, Seek, SeekFrom};

use crate::utils::{bytesv, le_u16, le_u32, u8};
use crate::{Error, Result};

const DIRECTORY_FLAG: u8 = 0x80;
const LENGTH_MASK: u8 = 0x7F;
const DIRECTORY_ID_MASK: u16 = 0x0FFF;

/// One row of the directory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryRow {
    /// Offset of the name list, relative to the table start.
    pub offset: u32,
    /// File id of the first file in the name list.
    pub top_file_id: u16,
    /// Parent directory id (for the root: the number of rows).
    pub parent: u16,
}

/// Resolved names of a file name table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNames {
    /// Path of every file id, [`None`] when no name list mentions it.
    pub paths: Vec<Option<String>>,
    /// Path of every directory, keyed by directory id. The root is `""`.
    pub directories: BTreeMap<u16, String>,
}

/// Read the directory rows at the start of `fnt`.
pub fn directory_rows(fnt: &[u8]) -> Result<Vec<DirectoryRow>> {
    let mut r = Cursor::new(fnt);
    let offset = le_u32(&mut r)?;
    let top_file_id = le_u16(&mut r)?;
    let count = le_u16(&mut r)?;
    if count == 0 {
        return Err(Error::Parse("file name table has no root directory"));
    }

    let mut rows = Vec::with_capacity(count as usize);
    rows.push(DirectoryRow {
        offset,
        top_file_id,
        parent: count,
    });
    for _ in 1..count {
        rows.push(DirectoryRow {
            offset: le_u32(&mut r)?,
            top_file_id: le_u16(&mut r)?,
            parent: le_u16(&mut r)?,
        });
    }
    Ok(rows)
}

/// Walk the table and assign a path to every named file id below
/// `file_count`.
pub fn resolve(fnt: &[u8], file_count: usize) -> Result<FileNames> {
    let rows = directory_rows(fnt)?;

    let mut names = FileNames {
        paths: vec![None; file_count],
        directories: BTreeMap::from([(0, String::new())]),
    };

    let mut r = Cursor::new(fnt);
    for (dir_id, row) in rows.iter().enumerate() {
        let dir_id = dir_id as u16;
        let dir_path = names
            .directories
            .get(&dir_id)
            .cloned()
            .ok_or(Error::UnregisteredDirectory(dir_id))?;

        r.seek(SeekFrom::Start(row.offset as u64))?;
        let mut file_id = row.top_file_id as usize;
        loop {
            let flags = u8(&mut r)?;
            let len = (flags & LENGTH_MASK) as usize;
            if len == 0 {
                break;
            }
            let name = bytesv(&mut r, len)?;
            let path = format!("{dir_path}/{}", String::from_utf8_lossy(&name));

            if flags & DIRECTORY_FLAG != 0 {
                let child = le_u16(&mut r)? & DIRECTORY_ID_MASK;
                tracing::trace!(child, %path, "directory");
                names.directories.insert(child, path);
            } else {
                let slot = names
                    .paths
                    .get_mut(file_id)
                    .ok_or(Error::Parse("file id outside the allocation table"))?;
                tracing::trace!(file_id, %path, "file");
                *slot = Some(path);
                file_id += 1;
            }
        }
    }

    tracing::debug!(
        directories = rows.len(),
        named = names.paths.iter().filter(|p| p.is_some()).count(),
        "resolved file name table"
    );
    Ok(names)
}
