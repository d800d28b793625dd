//! Decoded-texture model, content hashing, and Dolphin-compatible naming.

use std::hash::Hasher as _;

use twox_hash::XxHash64;

use crate::error::FormatError;
use crate::gx::{self, GxImageFormat, GxPaletteFormat};

/// Texture axis wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Clamp,
    Repeat,
    Mirror,
}

impl WrapMode {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::Clamp),
            1 => Some(Self::Repeat),
            2 => Some(Self::Mirror),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Clamp => "Clamp",
            Self::Repeat => "Repeat",
            Self::Mirror => "Mirror",
        }
    }
}

/// One image (plus its mip chain) pulled out of a texture file.
#[derive(Debug, Clone)]
pub struct TextureEntry {
    pub format: GxImageFormat,
    pub palette_format: GxPaletteFormat,
    /// Raw TLUT bytes, one per selectable palette. Empty for non-palette
    /// formats; palette formats with one TLUT hold a single element.
    pub palettes: Vec<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    /// Raw image data per mip level; `levels[0]` is the base.
    pub levels: Vec<Vec<u8>>,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub lod_bias: f32,
    pub min_lod: f32,
    pub max_lod: f32,
    pub edge_lod: bool,
}

impl TextureEntry {
    /// A single-level entry with neutral sampler state; texture openers fill
    /// in what their headers actually carry.
    pub fn single(format: GxImageFormat, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            format,
            palette_format: GxPaletteFormat::Ia8,
            palettes: Vec::new(),
            width,
            height,
            levels: vec![data],
            wrap_s: WrapMode::Clamp,
            wrap_t: WrapMode::Clamp,
            lod_bias: 0.0,
            min_lod: 0.0,
            max_lod: 0.0,
            edge_lod: false,
        }
    }

    pub fn mip_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// How many palette passes the dump loop makes: at least one, even for
    /// formats without palettes.
    pub fn palette_passes(&self) -> usize {
        self.palettes.len().max(1)
    }

    pub fn level_dims(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }

    /// XXH64 (seed 0) of the raw base-level data — the hash Dolphin derives
    /// its custom-texture names from.
    pub fn data_hash(&self) -> u64 {
        self.level_hash(0)
    }

    pub fn level_hash(&self, level: u32) -> u64 {
        self.levels
            .get(level as usize)
            .map(|d| xxh64(d))
            .unwrap_or(0)
    }

    /// XXH64 of palette `index`'s raw bytes; 0 for non-palette formats or a
    /// missing palette.
    pub fn tlut_hash(&self, index: usize) -> u64 {
        if !self.format.is_palette() {
            return 0;
        }
        self.palettes.get(index).map(|p| xxh64(p)).unwrap_or(0)
    }

    pub fn decode_level(&self, level: u32, palette: usize) -> Result<DecodedLevel, FormatError> {
        let (w, h) = self.level_dims(level);
        let data = self
            .levels
            .get(level as usize)
            .ok_or_else(|| FormatError::corrupt(format!("mip level {level} missing")))?;
        let empty: &[u8] = &[];
        let tlut = self
            .palettes
            .get(palette)
            .map(|p| p.as_slice())
            .unwrap_or(empty);
        let rgba = gx::decode(self.format, self.palette_format, data, tlut, w, h)?;
        Ok(DecodedLevel {
            width: w,
            height: h,
            rgba,
        })
    }

    /// Whether Dolphin would treat this texture as mipmapped. With Dolphin's
    /// own detection quirk enabled, a nonzero max LOD counts even when only
    /// one level is stored.
    pub fn counts_as_mipmapped(&self, dolphin_mip_detection: bool) -> bool {
        self.mip_count() > 1 || (dolphin_mip_detection && self.max_lod != 0.0)
    }

    /// Dolphin hires-texture file name (no directory, no `.png`).
    ///
    /// `hash` is the content hash to embed — the base hash normally, the
    /// level's own hash for arbitrary mip chains.
    pub fn dolphin_name(&self, level: u32, hash: u64, tlut_hash: u64, mipmapped: bool) -> String {
        let mut name = format!("tex1_{}x{}", self.width, self.height);
        if mipmapped {
            name.push_str("_m");
        }
        name.push_str(&format!("_{hash:016x}"));
        if self.format.is_palette() {
            name.push_str(&format!("_{tlut_hash:016x}"));
        }
        name.push_str(&format!("_{}", self.format.id()));
        if level > 0 {
            name.push_str(&format!("_mip{level}"));
        }
        name
    }
}

/// One decoded mip level, row-major RGBA8.
#[derive(Debug, Clone)]
pub struct DecodedLevel {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

fn xxh64(data: &[u8]) -> u64 {
    let mut h = XxHash64::with_seed(0);
    h.write(data);
    h.finish()
}

/// Chains scoring at or above this divergence carry hand-authored mip levels
/// rather than downscales of the base image.
pub const ARBITRARY_MIP_THRESHOLD: f32 = 0.18;

/// Mean normalized divergence between each mip level and a box-downscale of
/// its predecessor. 0.0 for chains shorter than two levels.
pub fn mip_divergence(levels: &[DecodedLevel]) -> f32 {
    if levels.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0f64;
    let mut pairs = 0u32;
    for pair in levels.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.width == 0 || b.height == 0 || b.rgba.is_empty() {
            continue;
        }
        let expected = box_downscale(a, b.width, b.height);
        let mut diff = 0.0f64;
        for (x, y) in expected.iter().zip(b.rgba.iter()) {
            diff += (*x as f64 - *y as f64).abs();
        }
        total += diff / (expected.len() as f64 * 255.0);
        pairs += 1;
    }
    if pairs == 0 {
        0.0
    } else {
        (total / pairs as f64) as f32
    }
}

/// Area-average downscale used as the "what a generated mip would look like"
/// reference.
fn box_downscale(src: &DecodedLevel, dw: u32, dh: u32) -> Vec<u8> {
    let mut out = vec![0u8; (dw * dh * 4) as usize];
    for dy in 0..dh {
        let y0 = dy * src.height / dh;
        let y1 = ((dy + 1) * src.height / dh).max(y0 + 1).min(src.height);
        for dx in 0..dw {
            let x0 = dx * src.width / dw;
            let x1 = ((dx + 1) * src.width / dw).max(x0 + 1).min(src.width);
            let mut acc = [0u64; 4];
            let mut n = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    let o = ((y * src.width + x) * 4) as usize;
                    for c in 0..4 {
                        acc[c] += src.rgba[o + c] as u64;
                    }
                    n += 1;
                }
            }
            let o = ((dy * dw + dx) * 4) as usize;
            for c in 0..4 {
                out[o + c] = (acc[c] / n.max(1)) as u8;
            }
        }
    }
    out
}
