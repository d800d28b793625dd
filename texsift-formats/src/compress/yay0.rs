//! Yay0 compression, the split-stream sibling of Yaz0.
//!
//! The header points at three separate streams: mask words (u32 BE, from
//! 0x10), a link table of u16 back-references, and a chunk stream of literal
//! bytes. A set mask bit pulls a literal from the chunk stream; a clear bit
//! reads a link whose low 12 bits are the distance and high 4 bits the count.

use texsift_core::{Decompressor, FormatError};
use texsift_core::util;

use super::{byte, check_decoded_size};

pub struct Yay0;

impl Decompressor for Yay0 {
    fn is_match(&self, head: &[u8], _len: u64) -> bool {
        head.starts_with(b"Yay0")
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, FormatError> {
        if !data.starts_with(b"Yay0") {
            return Err(FormatError::invalid_identifier(
                "Yay0",
                util::read_ascii(data.get(..4).unwrap_or(data)),
            ));
        }
        let size = util::read_u32_be(data, 4)? as usize;
        check_decoded_size(size)?;
        let mut link_pos = util::read_u32_be(data, 8)? as usize;
        let mut chunk_pos = util::read_u32_be(data, 12)? as usize;

        let mut out = Vec::with_capacity(size);
        let mut mask_pos = 16usize;
        let mut mask = 0u32;
        let mut bits = 0u8;
        while out.len() < size {
            if bits == 0 {
                mask = util::read_u32_be(data, mask_pos)?;
                mask_pos += 4;
                bits = 32;
            }
            if mask & 0x8000_0000 != 0 {
                out.push(byte(data, chunk_pos)?);
                chunk_pos += 1;
            } else {
                let link = util::read_u16_be(data, link_pos)?;
                link_pos += 2;
                let dist = (link & 0x0FFF) as usize;
                let count = match link >> 12 {
                    0 => {
                        let extra = byte(data, chunk_pos)?;
                        chunk_pos += 1;
                        extra as usize + 18
                    }
                    n => n as usize + 2,
                };
                // distance 0 repeats the previous byte
                let src = out
                    .len()
                    .checked_sub(dist + 1)
                    .ok_or_else(|| FormatError::corrupt("back-reference before start"))?;
                for i in 0..count {
                    if out.len() >= size {
                        break;
                    }
                    let b = out[src + i];
                    out.push(b);
                }
            }
            mask <<= 1;
            bits -= 1;
        }
        Ok(out)
    }
}
