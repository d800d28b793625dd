//! GameCube/Wii GX texture formats and block decoding.
//!
//! GX stores texels in tiled blocks whose dimensions depend on the format.
//! Every decoder here produces row-major RGBA8. Palette formats look indices
//! up in a TLUT of big-endian 16-bit entries.

use crate::error::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GxImageFormat {
    I4,
    I8,
    Ia4,
    Ia8,
    Rgb565,
    Rgb5a3,
    Rgba32,
    C4,
    C8,
    C14x2,
    Cmpr,
}

impl GxImageFormat {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::I4),
            1 => Some(Self::I8),
            2 => Some(Self::Ia4),
            3 => Some(Self::Ia8),
            4 => Some(Self::Rgb565),
            5 => Some(Self::Rgb5a3),
            6 => Some(Self::Rgba32),
            8 => Some(Self::C4),
            9 => Some(Self::C8),
            10 => Some(Self::C14x2),
            14 => Some(Self::Cmpr),
            _ => None,
        }
    }

    /// The GX enum value, which is also the format id Dolphin puts in
    /// dumped-texture names.
    pub fn id(&self) -> u32 {
        match self {
            Self::I4 => 0,
            Self::I8 => 1,
            Self::Ia4 => 2,
            Self::Ia8 => 3,
            Self::Rgb565 => 4,
            Self::Rgb5a3 => 5,
            Self::Rgba32 => 6,
            Self::C4 => 8,
            Self::C8 => 9,
            Self::C14x2 => 10,
            Self::Cmpr => 14,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::I4 => "I4",
            Self::I8 => "I8",
            Self::Ia4 => "IA4",
            Self::Ia8 => "IA8",
            Self::Rgb565 => "RGB565",
            Self::Rgb5a3 => "RGB5A3",
            Self::Rgba32 => "RGBA32",
            Self::C4 => "C4",
            Self::C8 => "C8",
            Self::C14x2 => "C14X2",
            Self::Cmpr => "CMPR",
        }
    }

    pub fn is_palette(&self) -> bool {
        matches!(self, Self::C4 | Self::C8 | Self::C14x2)
    }

    /// Tile dimensions (width, height) in pixels.
    pub fn block_size(&self) -> (u32, u32) {
        match self {
            Self::I4 | Self::C4 | Self::Cmpr => (8, 8),
            Self::I8 | Self::Ia4 | Self::C8 => (8, 4),
            Self::Ia8 | Self::Rgb565 | Self::Rgb5a3 | Self::Rgba32 | Self::C14x2 => (4, 4),
        }
    }

    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            Self::I4 | Self::C4 | Self::Cmpr => 4,
            Self::I8 | Self::Ia4 | Self::C8 => 8,
            Self::Ia8 | Self::Rgb565 | Self::Rgb5a3 | Self::C14x2 => 16,
            Self::Rgba32 => 32,
        }
    }

    /// Encoded byte length of one level with the given dimensions, rounded
    /// up to whole blocks.
    pub fn level_len(&self, width: u32, height: u32) -> usize {
        let (bw, bh) = self.block_size();
        let blocks = width.div_ceil(bw) as usize * height.div_ceil(bh) as usize;
        blocks * (bw * bh * self.bits_per_pixel()) as usize / 8
    }

    pub fn max_tlut_entries(&self) -> usize {
        match self {
            Self::C4 => 16,
            Self::C8 => 256,
            Self::C14x2 => 16384,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GxPaletteFormat {
    Ia8,
    Rgb565,
    Rgb5a3,
}

impl GxPaletteFormat {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::Ia8),
            1 => Some(Self::Rgb565),
            2 => Some(Self::Rgb5a3),
            _ => None,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::Ia8 => 0,
            Self::Rgb565 => 1,
            Self::Rgb5a3 => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ia8 => "IA8",
            Self::Rgb565 => "RGB565",
            Self::Rgb5a3 => "RGB5A3",
        }
    }
}

fn expand5(v: u16) -> u8 {
    ((v << 3) | (v >> 2)) as u8
}

fn expand6(v: u16) -> u8 {
    ((v << 2) | (v >> 4)) as u8
}

fn expand4(v: u16) -> u8 {
    (v * 0x11) as u8
}

fn rgb565_to_rgba(v: u16) -> [u8; 4] {
    [
        expand5((v >> 11) & 0x1F),
        expand6((v >> 5) & 0x3F),
        expand5(v & 0x1F),
        0xFF,
    ]
}

fn rgb5a3_to_rgba(v: u16) -> [u8; 4] {
    if v & 0x8000 != 0 {
        [
            expand5((v >> 10) & 0x1F),
            expand5((v >> 5) & 0x1F),
            expand5(v & 0x1F),
            0xFF,
        ]
    } else {
        let a3 = (v >> 12) & 0x7;
        [
            expand4((v >> 8) & 0xF),
            expand4((v >> 4) & 0xF),
            expand4(v & 0xF),
            ((a3 << 5) | (a3 << 2) | (a3 >> 1)) as u8,
        ]
    }
}

fn ia8_to_rgba(v: u16) -> [u8; 4] {
    let a = (v >> 8) as u8;
    let i = (v & 0xFF) as u8;
    [i, i, i, a]
}

fn tlut_entry(
    tlut: &[u8],
    index: usize,
    format: GxPaletteFormat,
) -> Result<[u8; 4], FormatError> {
    let off = index * 2;
    if off + 2 > tlut.len() {
        return Err(FormatError::corrupt(format!(
            "palette index {index} out of range ({} entries)",
            tlut.len() / 2
        )));
    }
    let v = u16::from_be_bytes([tlut[off], tlut[off + 1]]);
    Ok(match format {
        GxPaletteFormat::Ia8 => ia8_to_rgba(v),
        GxPaletteFormat::Rgb565 => rgb565_to_rgba(v),
        GxPaletteFormat::Rgb5a3 => rgb5a3_to_rgba(v),
    })
}

/// Decode one level of GX texture data to row-major RGBA8.
///
/// `tlut` is the raw big-endian palette data; only palette formats read it.
/// Fails when `data` is shorter than the format requires or a palette index
/// points past the TLUT.
pub fn decode(
    format: GxImageFormat,
    palette_format: GxPaletteFormat,
    data: &[u8],
    tlut: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, FormatError> {
    let needed = format.level_len(width, height);
    if data.len() < needed {
        return Err(FormatError::TooSmall {
            expected: needed as u64,
            actual: data.len() as u64,
        });
    }
    if width == 0 || height == 0 {
        return Err(FormatError::corrupt("zero-sized image"));
    }

    let mut out = vec![0u8; (width * height * 4) as usize];
    let mut put = |x: u32, y: u32, px: [u8; 4]| {
        if x < width && y < height {
            let o = ((y * width + x) * 4) as usize;
            out[o..o + 4].copy_from_slice(&px);
        }
    };

    let (bw, bh) = format.block_size();
    let mut pos = 0usize;

    match format {
        GxImageFormat::I4 => {
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    for y in 0..bh {
                        for x in (0..bw).step_by(2) {
                            let b = data[pos];
                            pos += 1;
                            let hi = expand4((b >> 4) as u16);
                            let lo = expand4((b & 0xF) as u16);
                            put(bx + x, by + y, [hi, hi, hi, hi]);
                            put(bx + x + 1, by + y, [lo, lo, lo, lo]);
                        }
                    }
                }
            }
        }
        GxImageFormat::I8 => {
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    for y in 0..bh {
                        for x in 0..bw {
                            let v = data[pos];
                            pos += 1;
                            put(bx + x, by + y, [v, v, v, v]);
                        }
                    }
                }
            }
        }
        GxImageFormat::Ia4 => {
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    for y in 0..bh {
                        for x in 0..bw {
                            let b = data[pos];
                            pos += 1;
                            let i = expand4((b & 0xF) as u16);
                            let a = expand4((b >> 4) as u16);
                            put(bx + x, by + y, [i, i, i, a]);
                        }
                    }
                }
            }
        }
        GxImageFormat::Ia8 | GxImageFormat::Rgb565 | GxImageFormat::Rgb5a3 => {
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    for y in 0..bh {
                        for x in 0..bw {
                            let v = u16::from_be_bytes([data[pos], data[pos + 1]]);
                            pos += 2;
                            let px = match format {
                                GxImageFormat::Ia8 => ia8_to_rgba(v),
                                GxImageFormat::Rgb565 => rgb565_to_rgba(v),
                                _ => rgb5a3_to_rgba(v),
                            };
                            put(bx + x, by + y, px);
                        }
                    }
                }
            }
        }
        GxImageFormat::Rgba32 => {
            // Two 32-byte groups per block: AR pairs then GB pairs.
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    let ar = pos;
                    let gb = pos + 32;
                    pos += 64;
                    for y in 0..bh {
                        for x in 0..bw {
                            let i = ((y * bw + x) * 2) as usize;
                            let px = [
                                data[ar + i + 1],
                                data[gb + i],
                                data[gb + i + 1],
                                data[ar + i],
                            ];
                            put(bx + x, by + y, px);
                        }
                    }
                }
            }
        }
        GxImageFormat::C4 => {
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    for y in 0..bh {
                        for x in (0..bw).step_by(2) {
                            let b = data[pos];
                            pos += 1;
                            put(
                                bx + x,
                                by + y,
                                tlut_entry(tlut, (b >> 4) as usize, palette_format)?,
                            );
                            put(
                                bx + x + 1,
                                by + y,
                                tlut_entry(tlut, (b & 0xF) as usize, palette_format)?,
                            );
                        }
                    }
                }
            }
        }
        GxImageFormat::C8 => {
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    for y in 0..bh {
                        for x in 0..bw {
                            let b = data[pos] as usize;
                            pos += 1;
                            put(bx + x, by + y, tlut_entry(tlut, b, palette_format)?);
                        }
                    }
                }
            }
        }
        GxImageFormat::C14x2 => {
            for by in (0..height).step_by(bh as usize) {
                for bx in (0..width).step_by(bw as usize) {
                    for y in 0..bh {
                        for x in 0..bw {
                            let v = u16::from_be_bytes([data[pos], data[pos + 1]]);
                            pos += 2;
                            put(
                                bx + x,
                                by + y,
                                tlut_entry(tlut, (v & 0x3FFF) as usize, palette_format)?,
                            );
                        }
                    }
                }
            }
        }
        GxImageFormat::Cmpr => {
            // 8x8 block of four DXT1-style 4x4 sub-blocks: TL, TR, BL, BR.
            for by in (0..height).step_by(8) {
                for bx in (0..width).step_by(8) {
                    for (sy, sx) in [(0u32, 0u32), (0, 4), (4, 0), (4, 4)] {
                        let c0 = u16::from_be_bytes([data[pos], data[pos + 1]]);
                        let c1 = u16::from_be_bytes([data[pos + 2], data[pos + 3]]);
                        let colors = cmpr_palette(c0, c1);
                        for y in 0..4 {
                            let bits = data[pos + 4 + y as usize];
                            for x in 0..4 {
                                let sel = (bits >> (6 - 2 * x)) & 0x3;
                                put(bx + sx + x, by + sy + y, colors[sel as usize]);
                            }
                        }
                        pos += 8;
                    }
                }
            }
        }
    }

    Ok(out)
}

fn cmpr_palette(c0: u16, c1: u16) -> [[u8; 4]; 4] {
    let a = rgb565_to_rgba(c0);
    let b = rgb565_to_rgba(c1);
    let mix = |x: u8, y: u8, num: u16, den: u16| -> u8 {
        ((x as u16 * num + y as u16 * (den - num)) / den) as u8
    };
    if c0 > c1 {
        [
            a,
            b,
            [
                mix(a[0], b[0], 2, 3),
                mix(a[1], b[1], 2, 3),
                mix(a[2], b[2], 2, 3),
                0xFF,
            ],
            [
                mix(a[0], b[0], 1, 3),
                mix(a[1], b[1], 1, 3),
                mix(a[2], b[2], 1, 3),
                0xFF,
            ],
        ]
    } else {
        [
            a,
            b,
            [
                mix(a[0], b[0], 1, 2),
                mix(a[1], b[1], 1, 2),
                mix(a[2], b[2], 1, 2),
                0xFF,
            ],
            [0, 0, 0, 0],
        ]
    }
}
