//! Byte-level read helpers for format parsers.
//!
//! Every access is bounds-checked and returns [`FormatError::TooSmall`]
//! instead of panicking, so parsers can lean on `?` all the way down.

use crate::error::FormatError;

fn need(data: &[u8], off: usize, len: usize) -> Result<(), FormatError> {
    let end = off.checked_add(len).ok_or(FormatError::TooSmall {
        expected: u64::MAX,
        actual: data.len() as u64,
    })?;
    if end > data.len() {
        return Err(FormatError::TooSmall {
            expected: end as u64,
            actual: data.len() as u64,
        });
    }
    Ok(())
}

pub fn read_u8(data: &[u8], off: usize) -> Result<u8, FormatError> {
    need(data, off, 1)?;
    Ok(data[off])
}

pub fn read_u16_be(data: &[u8], off: usize) -> Result<u16, FormatError> {
    need(data, off, 2)?;
    Ok(u16::from_be_bytes([data[off], data[off + 1]]))
}

pub fn read_u16_le(data: &[u8], off: usize) -> Result<u16, FormatError> {
    need(data, off, 2)?;
    Ok(u16::from_le_bytes([data[off], data[off + 1]]))
}

pub fn read_u24_be(data: &[u8], off: usize) -> Result<u32, FormatError> {
    need(data, off, 3)?;
    Ok(u32::from_be_bytes([0, data[off], data[off + 1], data[off + 2]]))
}

pub fn read_u24_le(data: &[u8], off: usize) -> Result<u32, FormatError> {
    need(data, off, 3)?;
    Ok(u32::from_le_bytes([data[off], data[off + 1], data[off + 2], 0]))
}

pub fn read_u32_be(data: &[u8], off: usize) -> Result<u32, FormatError> {
    need(data, off, 4)?;
    Ok(u32::from_be_bytes([
        data[off],
        data[off + 1],
        data[off + 2],
        data[off + 3],
    ]))
}

pub fn read_u32_le(data: &[u8], off: usize) -> Result<u32, FormatError> {
    need(data, off, 4)?;
    Ok(u32::from_le_bytes([
        data[off],
        data[off + 1],
        data[off + 2],
        data[off + 3],
    ]))
}

pub fn read_f32_be(data: &[u8], off: usize) -> Result<f32, FormatError> {
    Ok(f32::from_bits(read_u32_be(data, off)?))
}

pub fn read_bytes<'a>(data: &'a [u8], off: usize, len: usize) -> Result<&'a [u8], FormatError> {
    need(data, off, len)?;
    Ok(&data[off..off + len])
}

/// Read a null-terminated string starting at `off`. Non-printable bytes are
/// dropped. Errors only when `off` is past the end of the buffer.
pub fn read_cstring(data: &[u8], off: usize) -> Result<String, FormatError> {
    if off > data.len() {
        return Err(FormatError::TooSmall {
            expected: off as u64,
            actual: data.len() as u64,
        });
    }
    Ok(read_ascii(&data[off..]))
}

/// Printable characters of a null-terminated string. Bytes outside the
/// printable ASCII range are dropped rather than replaced, so garbage headers
/// render as short strings instead of mojibake.
pub fn read_ascii(buf: &[u8]) -> String {
    buf.iter()
        .take_while(|&&b| b != 0)
        .filter(|&&b| (0x20..0x7F).contains(&b))
        .map(|&b| b as char)
        .collect()
}

/// Split a file name into (stem, extension). The extension excludes the dot
/// and is returned as found — callers lowercase where needed. Names without
/// a dot (or starting with their only dot) have an empty extension.
pub fn split_name_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i + 1..]),
        _ => (name, ""),
    }
}
