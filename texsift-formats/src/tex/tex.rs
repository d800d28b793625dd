//! TEX images (`.tex`), a bare 32-byte header over raw GX pixel data.
//!
//! No magic; the format id doubles as one. Identification therefore needs
//! both the extension and a header that adds up: known format id, sane
//! dimensions, and a computed pixel size that fits inside the payload.

use texsift_core::util;
use texsift_core::{
    FormatError, GxImageFormat, SharedBytes, SiblingResolver, TextureEntry, TextureOpener,
};

const HEADER_LEN: usize = 0x20;

fn format_from_id(id: u32) -> Option<GxImageFormat> {
    match id {
        0x00 => Some(GxImageFormat::Rgba32),
        0x4B => Some(GxImageFormat::Ia8),
        0x4C => Some(GxImageFormat::Cmpr),
        _ => None,
    }
}

/// Matcher registered in the catalog: fires only for `.tex`-prefixed
/// extensions whose header passes the plausibility sums.
pub fn tex_matcher(head: &[u8], len: u64, extension: &str) -> bool {
    if !extension.to_ascii_lowercase().starts_with("tex") {
        return false;
    }
    let (Ok(format_id), Ok(width), Ok(height)) = (
        util::read_u32_be(head, 0),
        util::read_u32_be(head, 4),
        util::read_u32_be(head, 8),
    ) else {
        return false;
    };
    let Some(format) = format_from_id(format_id) else {
        return false;
    };
    width > 1
        && width <= 1024
        && height >= 1
        && height <= 1024
        && (HEADER_LEN + format.level_len(width, height)) as u64 <= len
}

pub struct TexFile;

impl TextureOpener for TexFile {
    fn open(
        &self,
        data: &SharedBytes,
        _name: &str,
        _siblings: &dyn SiblingResolver,
    ) -> Result<Vec<TextureEntry>, FormatError> {
        let d = data.as_slice();
        let format_id = util::read_u32_be(d, 0)?;
        let format = format_from_id(format_id)
            .ok_or_else(|| FormatError::unsupported(format!("image format {format_id:#x}")))?;
        let width = util::read_u32_be(d, 4)?;
        let height = util::read_u32_be(d, 8)?;
        if width == 0 || height == 0 || width > 1024 || height > 1024 {
            return Err(FormatError::corrupt(format!(
                "implausible dimensions {width}x{height}"
            )));
        }
        // u32 stored size @ 12 and mip count @ 20 are unreliable in the wild;
        // only the base level is read
        let pixels = util::read_bytes(d, HEADER_LEN, format.level_len(width, height))?.to_vec();
        Ok(vec![TextureEntry::single(format, width, height, pixels)])
    }
}

#[cfg(test)]
#[path = "tests/tex_tests.rs"]
mod tests;
