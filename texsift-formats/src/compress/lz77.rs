//! Nintendo LZ77 wrapper around the LZ10 bit-stream.
//!
//! Wrapped files carry a `"LZ77"` magic followed by the raw LZ10 stream:
//! type byte 0x10, decoded size as u24 LE, then flag-byte groups (MSB first)
//! where a set bit is a back-reference pair and a clear bit a literal. GBA-era
//! files often ship the bare stream with no magic, so the probe also accepts
//! a plausible headerless LZ10.

use texsift_core::{Decompressor, FormatError};
use texsift_core::util;

use super::{byte, check_decoded_size};

pub struct Lz77;

impl Decompressor for Lz77 {
    fn is_match(&self, head: &[u8], len: u64) -> bool {
        (head.starts_with(b"LZ77") && head.get(4) == Some(&0x10)) || raw_lz10_plausible(head, len)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, FormatError> {
        let body = if data.starts_with(b"LZ77") {
            &data[4..]
        } else {
            data
        };
        if body.first() != Some(&0x10) {
            return Err(FormatError::invalid_identifier(
                "LZ77",
                util::read_ascii(data.get(..4).unwrap_or(data)),
            ));
        }
        let size = util::read_u24_le(body, 1)? as usize;
        check_decoded_size(size)?;
        lz10_decode(body, 4, size)
    }
}

/// Headerless-LZ10 heuristic for the try-everything probe: correct type byte
/// and a decoded size that is no smaller than the compressed payload.
fn raw_lz10_plausible(head: &[u8], len: u64) -> bool {
    if head.len() < 4 || head[0] != 0x10 {
        return false;
    }
    let size = u32::from_le_bytes([head[1], head[2], head[3], 0]) as u64;
    size > 0 && size >= len.saturating_sub(4) && size <= 32 << 20
}

fn lz10_decode(data: &[u8], mut pos: usize, size: usize) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let flags = byte(data, pos)?;
        pos += 1;
        for bit in 0..8 {
            if out.len() >= size {
                break;
            }
            if flags & (0x80 >> bit) != 0 {
                let b1 = byte(data, pos)?;
                let b2 = byte(data, pos + 1)?;
                pos += 2;
                let count = ((b1 >> 4) as usize) + 3;
                let dist = (((b1 & 0x0F) as usize) << 8 | b2 as usize) + 1;
                let src = out
                    .len()
                    .checked_sub(dist)
                    .ok_or_else(|| FormatError::corrupt("back-reference before start"))?;
                for i in 0..count {
                    if out.len() >= size {
                        break;
                    }
                    let b = out[src + i];
                    out.push(b);
                }
            } else {
                out.push(byte(data, pos)?);
                pos += 1;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_decode() {
        // literal 'A' then a 9-byte run at distance 1
        let data = [
            b'L', b'Z', b'7', b'7', 0x10, 0x0A, 0x00, 0x00, 0x40, b'A', 0x60, 0x00,
        ];
        let out = Lz77.decompress(&data).unwrap();
        assert_eq!(out, vec![b'A'; 10]);
    }

    #[test]
    fn test_raw_stream_decode() {
        let data = [0x10, 0x04, 0x00, 0x00, 0x00, b'W', b'X', b'Y', b'Z'];
        let out = Lz77.decompress(&data).unwrap();
        assert_eq!(out, b"WXYZ");
    }

    #[test]
    fn test_probe() {
        assert!(Lz77.is_match(b"LZ77\x10rest", 100));
        assert!(!Lz77.is_match(b"LZ77\x11rest", 100));
        // bare stream: decoded size 64 for an 8-byte payload
        assert!(Lz77.is_match(&[0x10, 0x40, 0x00, 0x00], 8));
        // decoded size smaller than the payload is implausible
        assert!(!Lz77.is_match(&[0x10, 0x04, 0x00, 0x00], 4096));
    }

    #[test]
    fn test_rejects_wrong_type_byte() {
        assert!(Lz77.decompress(&[0x11, 0x04, 0x00, 0x00, 0x00]).is_err());
    }
}
