//! BTI texture images (`.bti`), the J3D standalone texture header.
//!
//! A fixed 0x20-byte header with all offsets relative to the header start.
//! BTI has no magic, so identification is extension-driven; [`probe_bti`]
//! additionally offers a strict plausibility check so raw payloads can be
//! swept for embedded headers.

use texsift_core::util;
use texsift_core::{
    FormatError, GxImageFormat, GxPaletteFormat, SharedBytes, SiblingResolver, TextureEntry,
    TextureOpener, WrapMode,
};

pub const BTI_HEADER_LEN: usize = 0x20;

pub struct Bti;

struct BtiHeader {
    format_id: u8,
    alpha: u8,
    width: u16,
    height: u16,
    wrap_s: u8,
    wrap_t: u8,
    palette_format_id: u16,
    palette_count: u16,
    palette_offset: u32,
    min_filter: u8,
    mag_filter: u8,
    min_lod: u8,
    max_lod: u8,
    mip_count: u8,
    lod_bias: i16,
    data_offset: u32,
}

fn read_header(d: &[u8], off: usize) -> Result<BtiHeader, FormatError> {
    Ok(BtiHeader {
        format_id: util::read_u8(d, off)?,
        alpha: util::read_u8(d, off + 1)?,
        width: util::read_u16_be(d, off + 2)?,
        height: util::read_u16_be(d, off + 4)?,
        wrap_s: util::read_u8(d, off + 6)?,
        wrap_t: util::read_u8(d, off + 7)?,
        palette_format_id: util::read_u16_be(d, off + 8)?,
        palette_count: util::read_u16_be(d, off + 10)?,
        palette_offset: util::read_u32_be(d, off + 12)?,
        min_filter: util::read_u8(d, off + 0x14)?,
        mag_filter: util::read_u8(d, off + 0x15)?,
        min_lod: util::read_u8(d, off + 0x16)?,
        max_lod: util::read_u8(d, off + 0x17)?,
        mip_count: util::read_u8(d, off + 0x18)?,
        lod_bias: util::read_u16_be(d, off + 0x1A)? as i16,
        data_offset: util::read_u32_be(d, off + 0x1C)?,
    })
}

/// Strict header plausibility, used when sweeping unidentified payloads for
/// embedded textures. Tighter than what the opener accepts: every enum field
/// must be in range and the dimensions must look like real art assets.
fn plausible(h: &BtiHeader) -> bool {
    let Some(format) = GxImageFormat::from_id(h.format_id as u32) else {
        return false;
    };
    let palette_ok = if format.is_palette() {
        h.palette_format_id <= 2 && h.palette_count as usize <= format.max_tlut_entries()
    } else {
        true
    };
    palette_ok
        && h.alpha <= 2
        && h.wrap_s <= 2
        && h.wrap_t <= 2
        && h.min_filter <= 5
        && h.mag_filter <= 1
        && h.width > 4
        && h.width < 1024
        && h.height > 4
        && h.height < 1024
        && h.mip_count >= 1
        && h.mip_count <= 10
        && h.data_offset != 0
}

fn parse_at(data: &SharedBytes, off: usize) -> Result<TextureEntry, FormatError> {
    let d = data.as_slice();
    let hdr = read_header(d, off)?;
    let format = GxImageFormat::from_id(hdr.format_id as u32)
        .ok_or_else(|| FormatError::unsupported(format!("image format {}", hdr.format_id)))?;
    if hdr.width == 0 || hdr.height == 0 || hdr.width > 1024 || hdr.height > 1024 {
        return Err(FormatError::corrupt(format!(
            "implausible dimensions {}x{}",
            hdr.width, hdr.height
        )));
    }
    let level_count = hdr.mip_count.clamp(1, 11) as u32;

    let mut levels = Vec::with_capacity(level_count as usize);
    let mut cursor = off + hdr.data_offset as usize;
    for level in 0..level_count {
        let (w, h) = (
            (u32::from(hdr.width) >> level).max(1),
            (u32::from(hdr.height) >> level).max(1),
        );
        let len = format.level_len(w, h);
        levels.push(util::read_bytes(d, cursor, len)?.to_vec());
        cursor += len;
    }

    let mut palettes = Vec::new();
    let mut palette_format = GxPaletteFormat::Ia8;
    if format.is_palette() {
        palette_format = GxPaletteFormat::from_id(hdr.palette_format_id as u32).ok_or_else(|| {
            FormatError::unsupported(format!("palette format {}", hdr.palette_format_id))
        })?;
        if hdr.palette_count > 0 {
            let pal_off = off + hdr.palette_offset as usize;
            palettes.push(util::read_bytes(d, pal_off, hdr.palette_count as usize * 2)?.to_vec());
        }
    }

    Ok(TextureEntry {
        format,
        palette_format,
        palettes,
        width: hdr.width.into(),
        height: hdr.height.into(),
        levels,
        wrap_s: WrapMode::from_id(hdr.wrap_s.into()).unwrap_or(WrapMode::Clamp),
        wrap_t: WrapMode::from_id(hdr.wrap_t.into()).unwrap_or(WrapMode::Clamp),
        lod_bias: f32::from(hdr.lod_bias) / 100.0,
        min_lod: f32::from(hdr.min_lod),
        max_lod: f32::from(hdr.max_lod),
        edge_lod: false,
    })
}

impl TextureOpener for Bti {
    fn open(
        &self,
        data: &SharedBytes,
        _name: &str,
        _siblings: &dyn SiblingResolver,
    ) -> Result<Vec<TextureEntry>, FormatError> {
        Ok(vec![parse_at(data, 0)?])
    }
}

/// Probe `data` at `off` for an embedded BTI. Returns the decoded entry and
/// the offset one past its pixel (and palette) data, or `None` when the bytes
/// there do not hold a plausible header.
pub fn probe_bti(data: &SharedBytes, off: usize) -> Option<(TextureEntry, usize)> {
    let d = data.as_slice();
    let header = read_header(d, off).ok()?;
    if !plausible(&header) {
        return None;
    }
    let entry = parse_at(data, off).ok()?;
    let format = entry.format;
    let mut end = off + header.data_offset as usize;
    for level in 0..entry.mip_count() {
        let (w, h) = entry.level_dims(level);
        end += format.level_len(w, h);
    }
    let palette_end = off + header.palette_offset as usize + header.palette_count as usize * 2;
    if format.is_palette() && header.palette_count > 0 {
        end = end.max(palette_end);
    }
    Some((entry, end))
}

#[cfg(test)]
#[path = "tests/bti_tests.rs"]
mod tests;
