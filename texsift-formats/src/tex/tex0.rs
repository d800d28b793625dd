//! TEX0 texture sections and their PLT0 palette companions (NW4R).
//!
//! Both carry the common NW4R section header (magic, length, version, outer
//! offset, section offsets). Version 3 inserts a name offset before the info
//! block; versions 1 and 3 are accepted. Palette-format TEX0s store no TLUT
//! of their own: the matching PLT0 lives next to them, either as
//! `<stem>.plt0` on disk or as a same-named entry in the package's
//! `Palettes(NW4R)` group.

use texsift_core::util;
use texsift_core::{
    FormatError, GxImageFormat, GxPaletteFormat, SharedBytes, SiblingResolver, TextureEntry,
    TextureOpener, WrapMode,
};

pub struct Tex0;

pub struct Plt0;

fn info_base(d: &[u8], magic: &[u8; 4]) -> Result<(usize, usize), FormatError> {
    if !d.starts_with(magic) {
        return Err(FormatError::invalid_identifier(
            String::from_utf8_lossy(magic),
            util::read_ascii(d.get(..4).unwrap_or(d)),
        ));
    }
    let version = util::read_u32_be(d, 8)?;
    if version != 1 && version != 3 {
        return Err(FormatError::unsupported(format!(
            "{} version {version}",
            String::from_utf8_lossy(magic)
        )));
    }
    let data_off = util::read_u32_be(d, 0x10)? as usize;
    // v3 adds a name offset after the section offset
    let base = if version >= 2 { 0x18 } else { 0x14 };
    Ok((base, data_off))
}

impl TextureOpener for Tex0 {
    fn open(
        &self,
        data: &SharedBytes,
        name: &str,
        siblings: &dyn SiblingResolver,
    ) -> Result<Vec<TextureEntry>, FormatError> {
        let d = data.as_slice();
        let (base, data_off) = info_base(d, b"TEX0")?;

        let width = util::read_u16_be(d, base + 4)? as u32;
        let height = util::read_u16_be(d, base + 6)? as u32;
        let format_id = util::read_u32_be(d, base + 8)?;
        let format = GxImageFormat::from_id(format_id)
            .ok_or_else(|| FormatError::unsupported(format!("image format {format_id}")))?;
        let image_count = util::read_u32_be(d, base + 12)?.max(1);
        if width == 0 || height == 0 || width > 4096 || height > 4096 {
            return Err(FormatError::corrupt(format!(
                "implausible dimensions {width}x{height}"
            )));
        }

        let level_count = image_count.min(11);
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
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            lod_bias: 0.0,
            min_lod: 0.0,
            max_lod: (level_count - 1) as f32,
            edge_lod: false,
        };

        if format.is_palette() {
            let (stem, _) = util::split_name_ext(name);
            let plt = siblings
                .request(&format!("{stem}.plt0"))
                .or_else(|_| siblings.request(stem))?;
            let (palette_format, palette) = read_plt0(plt.as_slice())?;
            entry.palette_format = palette_format;
            entry.palettes.push(palette);
        }
        Ok(vec![entry])
    }
}

fn read_plt0(d: &[u8]) -> Result<(GxPaletteFormat, Vec<u8>), FormatError> {
    let (base, data_off) = info_base(d, b"PLT0")?;
    let pfmt_id = util::read_u32_be(d, base)?;
    let palette_format = GxPaletteFormat::from_id(pfmt_id)
        .ok_or_else(|| FormatError::unsupported(format!("palette format {pfmt_id}")))?;
    let count = util::read_u16_be(d, base + 4)? as usize;
    if count == 0 || count > 16384 {
        return Err(FormatError::corrupt(format!(
            "implausible palette entry count {count}"
        )));
    }
    Ok((
        palette_format,
        util::read_bytes(d, data_off, count * 2)?.to_vec(),
    ))
}

/// PLT0 sections are palettes for a TEX0, not images; opening one on its own
/// only validates it.
impl TextureOpener for Plt0 {
    fn open(
        &self,
        data: &SharedBytes,
        _name: &str,
        _siblings: &dyn SiblingResolver,
    ) -> Result<Vec<TextureEntry>, FormatError> {
        read_plt0(data.as_slice())?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "tests/tex0_tests.rs"]
mod tests;
