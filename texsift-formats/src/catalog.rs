//! The format catalog: every format the scanner can name, and the
//! capabilities to act on the ones it can open.
//!
//! Identification is two-pass: descriptors with content evidence (signature
//! bytes or a matcher function) are consulted first, extension-only entries
//! after, so a wrong extension never beats real magic. Payloads nothing
//! claims get a synthesized unknown descriptor that remembers a printable
//! leading magic when one is present.

use std::sync::Arc;

use texsift_core::{Capability, FormatInfo, FormatKind, Signature};

use crate::arch::{Brres, Nlcm, Rarc, U8Arc, U8_MAGIC};
use crate::compress::{Lz77, Yay0, Yaz0};
use crate::tex::{Bti, Plt0, TPL_MAGIC, Tex0, TexFile, Tpl, tex_matcher};

/// How much of a payload's head identification may look at.
pub const HEAD_LEN: usize = 8192;

fn lz77_matcher(head: &[u8], _len: u64, _extension: &str) -> bool {
    head.starts_with(b"LZ77") && head.get(4) == Some(&0x10)
}

pub struct FormatCatalog {
    formats: Vec<FormatInfo>,
}

impl FormatCatalog {
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    pub fn register(&mut self, info: FormatInfo) {
        self.formats.push(info);
    }

    pub fn formats(&self) -> &[FormatInfo] {
        &self.formats
    }

    /// Match `head`/`len`/`extension` against the catalog. Always returns a
    /// descriptor; unrecognized payloads get a sniffed unknown.
    pub fn identify(&self, head: &[u8], len: u64, extension: &str) -> FormatInfo {
        for info in self.formats.iter().filter(|f| f.has_content_match()) {
            if info.matches(head, len, extension) {
                return info.clone();
            }
        }
        for info in self.formats.iter().filter(|f| !f.has_content_match()) {
            if info.matches(head, len, extension) {
                return info.clone();
            }
        }
        FormatInfo::sniff_unknown(head, extension)
    }

    /// Offer `data` to every registered decompressor in order; the first one
    /// whose probe and decode both succeed wins.
    pub fn try_decompress(&self, data: &[u8]) -> Option<(Vec<u8>, FormatInfo)> {
        let head = &data[..data.len().min(HEAD_LEN)];
        for info in &self.formats {
            if let Some(Capability::Compression(dec)) = &info.capability
                && dec.is_match(head, data.len() as u64)
                && let Ok(out) = dec.decompress(data)
            {
                return Some((out, info.clone()));
            }
        }
        None
    }

    /// The full catalog.
    pub fn standard() -> Self {
        use FormatKind::*;

        let mut c = Self::empty();

        // ---- Compression ----

        c.register(
            FormatInfo::new(Archive, "szs", "Yaz0 compressed data")
                .with_signature(Signature::new(b"Yaz0"))
                .with_capability(Capability::Compression(Arc::new(Yaz0))),
        );
        c.register(
            FormatInfo::new(Archive, "szp", "Yay0 compressed data")
                .with_signature(Signature::new(b"Yay0"))
                .with_capability(Capability::Compression(Arc::new(Yay0))),
        );
        c.register(
            FormatInfo::new(Archive, "lz77", "LZ77 compressed data")
                .with_signature(Signature::new(b"LZ77"))
                .with_matcher(lz77_matcher)
                .with_capability(Capability::Compression(Arc::new(Lz77))),
        );
        c.register(FormatInfo::new(Archive, "lzss", "LZSS compressed data")
            .with_signature(Signature::new(b"LZSS")));
        c.register(FormatInfo::new(Archive, "", "CLZ compressed data")
            .with_signature(Signature::new(b"CLZ")));
        c.register(FormatInfo::new(Archive, "", "CRILAYLA compressed data")
            .with_signature(Signature::new(b"CRILAYLA")));

        // ---- Archives ----

        c.register(
            FormatInfo::new(Archive, "arc", "JSystem resource archive")
                .with_signature(Signature::new(b"RARC"))
                .with_capability(Capability::Archive(Arc::new(Rarc))),
        );
        c.register(
            FormatInfo::new(Archive, "arc", "U8 bundle archive")
                .with_signature(Signature::new(&U8_MAGIC))
                .with_capability(Capability::Archive(Arc::new(U8Arc))),
        );
        c.register(
            FormatInfo::new(Archive, "brres", "NW4R resource package")
                .with_signature(Signature::new(b"bres"))
                .with_capability(Capability::Archive(Arc::new(Brres))),
        );
        c.register(
            FormatInfo::new(Archive, "", "NLCM table archive")
                .with_signature(Signature::new(b"NLCM"))
                .with_capability(Capability::Archive(Arc::new(Nlcm))),
        );
        c.register(FormatInfo::new(Archive, "narc", "Nitro archive")
            .with_signature(Signature::new(b"NARC")));
        c.register(FormatInfo::new(Archive, "cpk", "CRI package")
            .with_signature(Signature::new(b"CPK ")));
        c.register(FormatInfo::new(Archive, "afs", "CRI AFS container")
            .with_signature(Signature::new(&[0x41, 0x46, 0x53, 0x00])));
        c.register(FormatInfo::new(Archive, "sarc", "SARC archive")
            .with_signature(Signature::new(b"SARC")));
        c.register(FormatInfo::new(Archive, "darc", "darc archive")
            .with_signature(Signature::new(b"darc")));
        c.register(FormatInfo::new(Archive, "breft", "effect texture bank")
            .with_signature(Signature::new(b"REFT")));

        // ---- Discs and executables ----

        c.register(FormatInfo::new(Rom, "gcm", "GameCube disc image")
            .with_signature(Signature::at(&[0xC2, 0x33, 0x9F, 0x3D], 0x1C)));
        c.register(FormatInfo::new(Rom, "iso", "Wii disc image")
            .with_signature(Signature::at(&[0x5D, 0x1C, 0x9E, 0xA3], 0x18)));
        c.register(FormatInfo::new(Rom, "wbfs", "WBFS disc store")
            .with_signature(Signature::new(b"WBFS")));
        c.register(FormatInfo::new(Rom, "ciso", "compact disc image")
            .with_signature(Signature::new(b"CISO")));
        c.register(FormatInfo::new(Rom, "rvz", "RVZ disc image")
            .with_signature(Signature::new(&[0x52, 0x56, 0x5A, 0x01])));
        c.register(FormatInfo::new(Rom, "wia", "WIA disc image")
            .with_signature(Signature::new(&[0x57, 0x49, 0x41, 0x01])));
        c.register(FormatInfo::new(Rom, "wad", "Wii WAD package")
            .with_signature(Signature::new(&[0x00, 0x00, 0x00, 0x20, 0x49, 0x73])));
        c.register(FormatInfo::new(Rom, "elf", "ELF executable")
            .with_signature(Signature::new(&[0x7F, 0x45, 0x4C, 0x46])));
        c.register(FormatInfo::new(Rom, "dol", "GameCube executable"));
        c.register(FormatInfo::new(Rom, "rel", "relocatable module"));
        c.register(FormatInfo::new(Rom, "nes", "NES ROM")
            .with_signature(Signature::new(&[0x4E, 0x45, 0x53, 0x1A])));
        c.register(FormatInfo::new(Rom, "z64", "Nintendo 64 ROM")
            .with_signature(Signature::new(&[0x80, 0x37, 0x12, 0x40])));
        c.register(FormatInfo::new(Rom, "gba", "Game Boy Advance ROM")
            .with_signature(Signature::at(&[0x24, 0xFF, 0xAE, 0x51], 4)));

        // ---- Textures ----

        c.register(
            FormatInfo::new(Texture, "tpl", "texture page library")
                .with_signature(Signature::new(&TPL_MAGIC.to_be_bytes()))
                .with_capability(Capability::Texture(Arc::new(Tpl))),
        );
        c.register(
            FormatInfo::new(Texture, "tex0", "NW4R texture section")
                .with_signature(Signature::new(b"TEX0"))
                .with_capability(Capability::Texture(Arc::new(Tex0))),
        );
        c.register(
            FormatInfo::new(Texture, "plt0", "NW4R palette section")
                .with_signature(Signature::new(b"PLT0"))
                .with_capability(Capability::Texture(Arc::new(Plt0))),
        );
        c.register(FormatInfo::new(Texture, "bti", "J3D texture image")
            .with_capability(Capability::Texture(Arc::new(Bti))));
        c.register(
            FormatInfo::new(Texture, "tex", "raw GX texture")
                .with_matcher(tex_matcher)
                .with_capability(Capability::Texture(Arc::new(TexFile))),
        );
        c.register(FormatInfo::new(Texture, "png", "PNG image")
            .with_signature(Signature::new(&[0x89, 0x50, 0x4E, 0x47])));
        c.register(FormatInfo::new(Texture, "dds", "DirectDraw surface")
            .with_signature(Signature::new(b"DDS ")));

        // ---- Models and animation ----

        c.register(FormatInfo::new(Model, "bmd", "J3D model")
            .with_signature(Signature::new(b"J3D2bmd3")));
        c.register(FormatInfo::new(Model, "bdl", "J3D model (display lists)")
            .with_signature(Signature::new(b"J3D2bdl4")));
        c.register(FormatInfo::new(Model, "mdl0", "NW4R model section")
            .with_signature(Signature::new(b"MDL0")));
        c.register(FormatInfo::new(Animation, "bck", "J3D joint animation")
            .with_signature(Signature::new(b"J3D1bck1")));
        c.register(FormatInfo::new(Animation, "btk", "J3D uv animation")
            .with_signature(Signature::new(b"J3D1btk1")));
        c.register(FormatInfo::new(Animation, "brk", "J3D register animation")
            .with_signature(Signature::new(b"J3D1brk1")));
        c.register(FormatInfo::new(Animation, "btp", "J3D texture-swap animation")
            .with_signature(Signature::new(b"J3D1btp1")));
        c.register(FormatInfo::new(Animation, "bca", "J3D full animation")
            .with_signature(Signature::new(b"J3D1bca1")));
        c.register(FormatInfo::new(Animation, "bva", "J3D visibility animation")
            .with_signature(Signature::new(b"J3D1bva1")));
        c.register(FormatInfo::new(Animation, "chr0", "NW4R bone animation")
            .with_signature(Signature::new(b"CHR0")));
        c.register(FormatInfo::new(Animation, "clr0", "NW4R color animation")
            .with_signature(Signature::new(b"CLR0")));
        c.register(FormatInfo::new(Animation, "srt0", "NW4R uv animation")
            .with_signature(Signature::new(b"SRT0")));
        c.register(FormatInfo::new(Animation, "pat0", "NW4R pattern animation")
            .with_signature(Signature::new(b"PAT0")));
        c.register(FormatInfo::new(Else, "jpc", "JParticle bank")
            .with_signature(Signature::new(b"JPAC")));

        // ---- Audio ----

        c.register(FormatInfo::new(Audio, "brsar", "NW4R sound archive")
            .with_signature(Signature::new(b"RSAR")));
        c.register(FormatInfo::new(Audio, "brstm", "NW4R audio stream")
            .with_signature(Signature::new(b"RSTM")));
        c.register(FormatInfo::new(Audio, "bfstm", "Cafe audio stream")
            .with_signature(Signature::new(b"FSTM")));
        c.register(FormatInfo::new(Audio, "ast", "AST audio stream")
            .with_signature(Signature::new(b"STRM")));
        c.register(FormatInfo::new(Audio, "baa", "J3D audio archive")
            .with_signature(Signature::new(b"AA_<")));
        c.register(FormatInfo::new(Audio, "hps", "HALPST audio stream")
            .with_signature(Signature::new(b" HALPST")));
        c.register(FormatInfo::new(Audio, "dsp", "DSP-ADPCM audio"));
        c.register(FormatInfo::new(Audio, "aw", "audio wave archive"));

        // ---- Video ----

        c.register(FormatInfo::new(Video, "thp", "THP video")
            .with_signature(Signature::new(b"THP\0")));
        c.register(FormatInfo::new(Video, "bik", "Bink video")
            .with_signature(Signature::new(b"BIK")));
        c.register(FormatInfo::new(Video, "sfd", "MPEG program stream")
            .with_signature(Signature::new(&[0x00, 0x00, 0x01, 0xBA])));
        c.register(FormatInfo::new(Video, "h4m", "HVQM4 video")
            .with_signature(Signature::new(b"HVQM4")));

        // ---- Text, fonts, layout ----

        c.register(FormatInfo::new(Text, "bmg", "message bank")
            .with_signature(Signature::new(b"MESGbmg1")));
        c.register(FormatInfo::new(Text, "msbt", "message standard binary")
            .with_signature(Signature::new(b"MsgStdBn")));
        c.register(FormatInfo::new(Text, "bmc", "message colors")
            .with_signature(Signature::new(b"MGCLbmc1")));
        c.register(FormatInfo::new(Text, "txt", "plain text"));
        c.register(FormatInfo::new(Font, "brfnt", "NW4R font")
            .with_signature(Signature::new(b"RFNT")));
        c.register(FormatInfo::new(Font, "bfn", "J3D font")
            .with_signature(Signature::new(b"FONTbfn1")));
        c.register(FormatInfo::new(Layout, "brlyt", "NW4R layout")
            .with_signature(Signature::new(b"RLYT")));
        c.register(FormatInfo::new(Animation, "brlan", "NW4R layout animation")
            .with_signature(Signature::new(b"RLAN")));
        c.register(FormatInfo::new(Layout, "blo", "J2D screen layout")
            .with_signature(Signature::new(b"SCRNblo1")));

        // ---- Wii system data ----

        c.register(FormatInfo::new(Else, "", "Wii banner metadata")
            .with_signature(Signature::at(b"IMET", 0x40)));
        c.register(FormatInfo::new(Else, "", "Wii banner metadata")
            .with_signature(Signature::at(b"IMET", 0x80)));
        c.register(FormatInfo::new(Else, "", "Wii banner image container")
            .with_signature(Signature::new(b"IMD5")));
        c.register(FormatInfo::new(Else, "bnr", "GameCube banner")
            .with_signature(Signature::new(b"BNR1")));
        c.register(FormatInfo::new(Else, "bnr", "GameCube banner (multilingual)")
            .with_signature(Signature::new(b"BNR2")));

        c
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
