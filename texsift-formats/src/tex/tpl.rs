//! TPL texture pages (`.tpl`), the GameCube SDK's multi-image container.
//!
//! The header counts images and points at an offset table of
//! `{image_header, palette_header}` pairs. Image headers carry dimensions,
//! GX format, sampler state, and the LOD range; mip levels follow each other
//! directly in memory, so level lengths are derived from the format.

use texsift_core::util;
use texsift_core::{
    FormatError, GxImageFormat, GxPaletteFormat, SharedBytes, SiblingResolver, TextureEntry,
    TextureOpener, WrapMode,
};

pub const TPL_MAGIC: u32 = 0x0020_AF30;

const MAX_IMAGES: usize = 4096;
const MAX_LEVELS: u32 = 11;

pub struct Tpl;

impl TextureOpener for Tpl {
    fn open(
        &self,
        data: &SharedBytes,
        _name: &str,
        _siblings: &dyn SiblingResolver,
    ) -> Result<Vec<TextureEntry>, FormatError> {
        let d = data.as_slice();
        let magic = util::read_u32_be(d, 0)?;
        if magic != TPL_MAGIC {
            return Err(FormatError::invalid_identifier(
                "TPL",
                format!("{magic:#010x}"),
            ));
        }
        let count = util::read_u32_be(d, 4)? as usize;
        if count == 0 || count > MAX_IMAGES {
            return Err(FormatError::corrupt(format!(
                "implausible image count {count}"
            )));
        }
        let table = util::read_u32_be(d, 8)? as usize;

        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let image_off = util::read_u32_be(d, table + i * 8)? as usize;
            let palette_off = util::read_u32_be(d, table + i * 8 + 4)? as usize;
            out.push(read_image(d, image_off, palette_off)?);
        }
        Ok(out)
    }
}

fn read_image(d: &[u8], off: usize, palette_off: usize) -> Result<TextureEntry, FormatError> {
    let height = util::read_u16_be(d, off)? as u32;
    let width = util::read_u16_be(d, off + 2)? as u32;
    let format_id = util::read_u32_be(d, off + 4)?;
    let format = GxImageFormat::from_id(format_id)
        .ok_or_else(|| FormatError::unsupported(format!("image format {format_id}")))?;
    let data_off = util::read_u32_be(d, off + 8)? as usize;
    let wrap_s = WrapMode::from_id(util::read_u32_be(d, off + 12)?).unwrap_or(WrapMode::Clamp);
    let wrap_t = WrapMode::from_id(util::read_u32_be(d, off + 16)?).unwrap_or(WrapMode::Clamp);
    // min/mag filters at +20/+24 are sampler state the dump does not carry
    let lod_bias = util::read_f32_be(d, off + 28)?;
    let edge_lod = util::read_u8(d, off + 32)? != 0;
    let min_lod = util::read_u8(d, off + 33)? as f32;
    let max_lod = util::read_u8(d, off + 34)? as f32;

    if width == 0 || height == 0 || width > 4096 || height > 4096 {
        return Err(FormatError::corrupt(format!(
            "implausible dimensions {width}x{height}"
        )));
    }

    let level_count = (max_lod as u32 + 1).min(MAX_LEVELS);
    let mut levels = Vec::with_capacity(level_count as usize);
    let mut cursor = data_off;
    for level in 0..level_count {
        let (w, h) = ((width >> level).max(1), (height >> level).max(1));
        let len = format.level_len(w, h);
        levels.push(util::read_bytes(d, cursor, len)?.to_vec());
        cursor += len;
    }

    let mut entry = TextureEntry {
        format,
        palette_format: GxPaletteFormat::Ia8,
        palettes: Vec::new(),
        width,
        height,
        levels,
        wrap_s,
        wrap_t,
        lod_bias,
        min_lod,
        max_lod,
        edge_lod,
    };

    if format.is_palette() {
        if palette_off == 0 {
            return Err(FormatError::unsupported(
                "palette format without a palette header",
            ));
        }
        let entries = util::read_u16_be(d, palette_off)? as usize;
        let pfmt_id = util::read_u32_be(d, palette_off + 4)?;
        entry.palette_format = GxPaletteFormat::from_id(pfmt_id)
            .ok_or_else(|| FormatError::unsupported(format!("palette format {pfmt_id}")))?;
        let pdata = util::read_u32_be(d, palette_off + 8)? as usize;
        entry
            .palettes
            .push(util::read_bytes(d, pdata, entries * 2)?.to_vec());
    }
    Ok(entry)
}

#[cfg(test)]
#[path = "tests/tpl_tests.rs"]
mod tests;
