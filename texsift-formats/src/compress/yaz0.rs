//! Yaz0 run-length compression, the `.szs` wrapper used across GC/Wii games.
//!
//! Layout: `"Yaz0"`, decoded size (u32 BE), 8 reserved bytes, then groups of
//! eight operations announced by a flag byte. A set bit copies one literal; a
//! clear bit reads a back-reference pair (distance 1..0x1000, length 3..273).

use texsift_core::{Decompressor, FormatError};
use texsift_core::util;

use super::{byte, check_decoded_size};

pub struct Yaz0;

impl Decompressor for Yaz0 {
    fn is_match(&self, head: &[u8], _len: u64) -> bool {
        head.starts_with(b"Yaz0")
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, FormatError> {
        if !data.starts_with(b"Yaz0") {
            return Err(FormatError::invalid_identifier(
                "Yaz0",
                util::read_ascii(data.get(..4).unwrap_or(data)),
            ));
        }
        let size = util::read_u32_be(data, 4)? as usize;
        check_decoded_size(size)?;

        let mut out = Vec::with_capacity(size);
        let mut pos = 16usize;
        let mut flags = 0u8;
        let mut bits = 0u8;
        while out.len() < size {
            if bits == 0 {
                flags = byte(data, pos)?;
                pos += 1;
                bits = 8;
            }
            if flags & 0x80 != 0 {
                out.push(byte(data, pos)?);
                pos += 1;
            } else {
                let b1 = byte(data, pos)?;
                let b2 = byte(data, pos + 1)?;
                pos += 2;
                let dist = (((b1 & 0x0F) as usize) << 8 | b2 as usize) + 1;
                let count = match b1 >> 4 {
                    0 => {
                        let extra = byte(data, pos)?;
                        pos += 1;
                        extra as usize + 0x12
                    }
                    n => n as usize + 2,
                };
                let src = out
                    .len()
                    .checked_sub(dist)
                    .ok_or_else(|| FormatError::corrupt("back-reference before start"))?;
                for i in 0..count {
                    if out.len() >= size {
                        break;
                    }
                    // may overlap the bytes being written, so copy one at a time
                    let b = out[src + i];
                    out.push(b);
                }
            }
            flags <<= 1;
            bits -= 1;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(size: u32, body: &[u8]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(b"Yaz0");
        v.extend_from_slice(&size.to_be_bytes());
        v.extend_from_slice(&[0u8; 8]);
        v.extend_from_slice(body);
        v
    }

    #[test]
    fn test_literals_and_short_reference() {
        // three literals "ABC" then a 9-byte copy from distance 3
        let data = wrap(12, &[0xE0, b'A', b'B', b'C', 0x70, 0x02]);
        let out = Yaz0.decompress(&data).unwrap();
        assert_eq!(out, b"ABCABCABCABC");
    }

    #[test]
    fn test_long_reference() {
        // one literal then a 39-byte run at distance 1 via the extra-count form
        let data = wrap(40, &[0x80, b'A', 0x00, 0x00, 0x15]);
        let out = Yaz0.decompress(&data).unwrap();
        assert_eq!(out, vec![b'A'; 40]);
    }

    #[test]
    fn test_rejects_wrong_magic() {
        assert!(Yaz0.decompress(b"Yay0\x00\x00\x00\x04").is_err());
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let data = wrap(100, &[0xFF, b'A', b'B']);
        assert!(Yaz0.decompress(&data).is_err());
    }

    #[test]
    fn test_rejects_reference_before_start() {
        // first op is a back-reference with nothing decoded yet
        let data = wrap(4, &[0x00, 0x10, 0x00]);
        assert!(Yaz0.decompress(&data).is_err());
    }
}
