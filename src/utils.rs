//! Low-level I/O primitives shared by all parsers.
//!
//! The stream readers each read exactly the bytes they promise or return an
//! error - there is no partial-read ambiguity. The slice helpers do the same
//! for formats that are parsed from an in-memory chunk.

use std::io::Read;

use crate::{Error, Result};

/// Read one byte.
#[inline]
pub(crate) fn u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

/// Read a little-endian `u16`.
#[inline]
pub(crate) fn le_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

/// Read a little-endian `u32`.
#[inline]
pub(crate) fn le_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

/// Read a little-endian `u64`.
#[inline]
pub(crate) fn le_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_le_bytes(b))
}

/// Read exactly `N` bytes into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize>(r: &mut impl Read) -> Result<[u8; N]> {
    let mut b = [0u8; N];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Read exactly `len` bytes into a `Vec`.
///
/// The buffer grows with the data actually read, so a bogus length from a
/// corrupt header fails with [`Error::UnexpectedEof`] instead of allocating.
pub(crate) fn bytesv<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut b = Vec::new();
    r.by_ref().take(len as u64).read_to_end(&mut b)?;
    if b.len() != len {
        return Err(Error::UnexpectedEof);
    }
    Ok(b)
}

/// Verify that the next `N` bytes in the stream match `expected`.
///
/// Returns [`Error::BadMagic`] on mismatch.
#[inline]
pub(crate) fn magic<R: Read, const N: usize>(r: &mut R, expected: &'static [u8; N]) -> Result<()> {
    let got = bytesa::<N>(r)?;
    if &got != expected {
        return Err(Error::BadMagic { expected });
    }
    Ok(())
}

/// Borrow `len` bytes of `buf` starting at `offset`.
///
/// Returns [`Error::InvalidRange`] instead of panicking when the range does
/// not fit.
#[inline]
pub(crate) fn range(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).ok_or(Error::InvalidRange)?;
    buf.get(offset..end).ok_or(Error::InvalidRange)
}

/// Little-endian `u16` at a byte offset inside `buf`.
#[inline]
pub(crate) fn le_u16_at(buf: &[u8], offset: usize) -> Result<u16> {
    let b = range(buf, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Iterate `buf` as little-endian 16-bit words. A trailing odd byte is
/// ignored.
pub(crate) fn le_words(buf: &[u8]) -> impl Iterator<Item = u16> + '_ {
    buf.chunks_exact(2).map(|w| u16::from_le_bytes([w[0], w[1]]))
}

/// Decode a fixed-width, NUL-padded byte string.
pub(crate) fn padded_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Decode a fixed-width, NUL-padded UTF-16LE string.
pub(crate) fn utf16_padded_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = le_words(bytes).take_while(|&u| u != 0).collect();
    String::from_utf16_lossy(&units)
}
