//! Texture dumping: dedup, decode, arbitrary-mip detection, PNG output.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use texsift_core::texture::{mip_divergence, ARBITRARY_MIP_THRESHOLD};
use texsift_core::{DecodedLevel, FormatError, SharedBytes, TextureEntry};

use crate::cascade::ScanCtx;
use crate::report;
use crate::scanner::ScanUnit;

/// Dump every entry of an opened texture, one pass per palette. Returns
/// the number of unique images this unit contributed.
pub(crate) fn dump_entries(
    ctx: &ScanCtx<'_>,
    unit: &ScanUnit,
    entries: &[TextureEntry],
    prefix: Option<&str>,
) -> u64 {
    let mut images = 0;
    for entry in entries {
        for pass in 0..entry.palette_passes() {
            if dump_one(ctx, unit, entry, pass, prefix) {
                images += 1;
            }
        }
    }
    images
}

fn dump_one(
    ctx: &ScanCtx<'_>,
    unit: &ScanUnit,
    entry: &TextureEntry,
    pass: usize,
    prefix: Option<&str>,
) -> bool {
    let tlut_hash = entry.tlut_hash(pass);
    let base_hash = entry.data_hash();
    // Dolphin only finds a dump whose mip flag matches its own lookup, so
    // flat and mip-capable variants of the same payload dedup separately.
    let mip_capable = entry.max_lod != 0.0 || entry.mip_count() > 1;
    let key = report::texture_key(base_hash, mip_capable, entry.format.is_palette(), tlut_hash);
    if !ctx.report.claim_texture(key) {
        return false;
    }

    let mipmapped = entry.counts_as_mipmapped(ctx.options.dolphin_mip_detection);
    let mut arbitrary = false;
    let mut arb_score = 0.0f32;

    let rel_dir = match prefix {
        Some(p) => format!("{p}/{}", unit.path),
        None => unit.path.clone(),
    };
    let out_dir = ctx.save_dir.join(&rel_dir);

    if !ctx.options.dry_run {
        let levels = match decode_all(entry, pass) {
            Ok(levels) => levels,
            Err(e) => {
                ctx.log.error(&rel_dir, &e.to_string());
                ctx.report.bump_unsupported();
                return false;
            }
        };
        if ctx.options.arbitrary_mip_detection && entry.mip_count() > 1 {
            arb_score = mip_divergence(&levels);
            arbitrary = arb_score >= ARBITRARY_MIP_THRESHOLD;
        }
        if let Err(e) = write_levels(
            ctx, entry, &levels, &out_dir, base_hash, tlut_hash, mipmapped, arbitrary,
        ) {
            ctx.log.error(&rel_dir, &e.to_string());
            ctx.report.bump_unsupported();
            return false;
        }
    }

    let base_name = entry.dolphin_name(0, base_hash, tlut_hash, mipmapped);
    let mut detail = format!(
        "mips:{} WrapS:{} WrapT:{} LODBias:{} MinLOD:{} MaxLOD:{}",
        entry.mip_count().saturating_sub(1),
        entry.wrap_s.name(),
        entry.wrap_t.name(),
        entry.lod_bias,
        entry.min_lod,
        entry.max_lod
    );
    if entry.mip_count() > 1 {
        detail.push_str(&format!(" ArbMipValue:{arb_score:.3}"));
    }
    ctx.log.extract(&format!("{rel_dir}/{base_name}.png"), &detail);

    if let Some(cb) = &ctx.options.texture_cb {
        cb(entry, &out_dir.join(format!("{base_name}.png")));
    }
    true
}

fn decode_all(entry: &TextureEntry, pass: usize) -> Result<Vec<DecodedLevel>, FormatError> {
    (0..entry.mip_count())
        .map(|level| entry.decode_level(level, pass))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn write_levels(
    ctx: &ScanCtx<'_>,
    entry: &TextureEntry,
    levels: &[DecodedLevel],
    out_dir: &Path,
    base_hash: u64,
    tlut_hash: u64,
    mipmapped: bool,
    arbitrary: bool,
) -> Result<(), FormatError> {
    ensure_dir(out_dir)?;
    for (i, decoded) in levels.iter().enumerate() {
        let level = i as u32;
        let hash = if arbitrary {
            entry.level_hash(level)
        } else {
            base_hash
        };
        let name = entry.dolphin_name(level, hash, tlut_hash, mipmapped);
        write_png(decoded, &out_dir.join(format!("{name}.png")))?;
        if !arbitrary && !ctx.options.mips {
            break;
        }
    }
    Ok(())
}

fn write_png(level: &DecodedLevel, path: &Path) -> Result<(), FormatError> {
    let image = RgbaImage::from_raw(level.width, level.height, level.rgba.clone())
        .ok_or_else(|| FormatError::corrupt("decoded level size mismatch"))?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| FormatError::unsupported(format!("png write: {e}")))
}

/// Undecoded copy of a recognized texture payload under `~Raw`, extension
/// swapped to the format's canonical one.
pub(crate) fn save_raw(
    ctx: &ScanCtx<'_>,
    unit: &ScanUnit,
    data: &SharedBytes,
) -> Result<(), FormatError> {
    if ctx.options.dry_run {
        return Ok(());
    }
    let ext = if unit.format.extension.is_empty() {
        &unit.extension
    } else {
        &unit.format.extension
    };
    let rel = if ext.is_empty() {
        format!("~Raw/{}", unit.path)
    } else {
        format!("~Raw/{}.{ext}", unit.path)
    };
    let path = ctx.save_dir.join(&rel);
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(&path, data.as_slice())?;
    Ok(())
}

// A file squatting on a needed directory name moves aside.
fn ensure_dir(dir: &Path) -> Result<(), FormatError> {
    if dir.is_file() {
        let mut moved = dir.as_os_str().to_owned();
        moved.push("_");
        fs::rename(dir, PathBuf::from(moved))?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
