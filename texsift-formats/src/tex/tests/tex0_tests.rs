use super::*;
use texsift_core::NoSiblings;

fn make_tex0(format_id: u32, width: u16, height: u16, pixel_len: usize) -> Vec<u8> {
    let data_off = 0x40usize;
    let mut v = vec![0u8; data_off + pixel_len];
    v[0..4].copy_from_slice(b"TEX0");
    v[4..8].copy_from_slice(&((data_off + pixel_len) as u32).to_be_bytes());
    v[8..12].copy_from_slice(&3u32.to_be_bytes()); // version
    v[16..20].copy_from_slice(&(data_off as u32).to_be_bytes());
    let base = 0x18;
    v[base + 4..base + 6].copy_from_slice(&width.to_be_bytes());
    v[base + 6..base + 8].copy_from_slice(&height.to_be_bytes());
    v[base + 8..base + 12].copy_from_slice(&format_id.to_be_bytes());
    v[base + 12..base + 16].copy_from_slice(&1u32.to_be_bytes()); // image count
    v
}

fn make_plt0(pfmt: u32, entries: &[u16]) -> Vec<u8> {
    let data_off = 0x20usize;
    let mut v = vec![0u8; data_off + entries.len() * 2];
    v[0..4].copy_from_slice(b"PLT0");
    let total_len = v.len() as u32;
    v[4..8].copy_from_slice(&total_len.to_be_bytes());
    v[8..12].copy_from_slice(&3u32.to_be_bytes());
    v[16..20].copy_from_slice(&(data_off as u32).to_be_bytes());
    let base = 0x18;
    v[base..base + 4].copy_from_slice(&pfmt.to_be_bytes());
    v[base + 4..base + 6].copy_from_slice(&(entries.len() as u16).to_be_bytes());
    for (i, e) in entries.iter().enumerate() {
        v[data_off + i * 2..data_off + i * 2 + 2].copy_from_slice(&e.to_be_bytes());
    }
    v
}

struct Stem(String, SharedBytes);

impl SiblingResolver for Stem {
    fn request(&self, name: &str) -> Result<SharedBytes, FormatError> {
        if self.0 == name {
            Ok(self.1.clone())
        } else {
            Err(FormatError::MissingSibling(name.to_string()))
        }
    }
}

#[test]
fn test_i8_section() {
    let raw = make_tex0(1, 8, 8, GxImageFormat::I8.level_len(8, 8));
    let entries = Tex0
        .open(&SharedBytes::new(raw), "grain", &NoSiblings)
        .unwrap();
    assert_eq!(entries.len(), 1);
    let e = &entries[0];
    assert_eq!(e.format, GxImageFormat::I8);
    assert_eq!((e.width, e.height), (8, 8));
    assert!(e.palettes.is_empty());
}

#[test]
fn test_c8_pulls_palette_from_sibling() {
    let raw = make_tex0(9, 8, 4, GxImageFormat::C8.level_len(8, 4));
    let plt = SharedBytes::new(make_plt0(2, &[0x8000, 0x801F, 0xFFFF, 0x0000]));
    // the bare-stem fallback must fire after "wood.plt0" misses
    let resolver = Stem("wood".to_string(), plt);

    let entries = Tex0
        .open(&SharedBytes::new(raw), "wood", &resolver)
        .unwrap();
    let e = &entries[0];
    assert_eq!(e.palette_format, GxPaletteFormat::Rgb5a3);
    assert_eq!(e.palettes[0].len(), 8);

    // index 0 everywhere; entry 0 is opaque black (top bit set)
    let decoded = e.decode_level(0, 0).unwrap();
    assert_eq!(&decoded.rgba[..4], &[0, 0, 0, 255]);
}

#[test]
fn test_c8_without_palette_is_an_error() {
    let raw = make_tex0(9, 8, 4, GxImageFormat::C8.level_len(8, 4));
    let err = Tex0
        .open(&SharedBytes::new(raw), "wood", &NoSiblings)
        .unwrap_err();
    assert!(matches!(err, FormatError::MissingSibling(_)));
}

#[test]
fn test_plt0_standalone_validates_only() {
    let raw = make_plt0(1, &[0x0000, 0xFFFF]);
    let entries = Plt0
        .open(&SharedBytes::new(raw), "wood.plt0", &NoSiblings)
        .unwrap();
    assert!(entries.is_empty());

    let mut bad = make_plt0(1, &[0x0000]);
    bad[0x18 + 3] = 9; // palette format out of range
    assert!(
        Plt0.open(&SharedBytes::new(bad), "wood.plt0", &NoSiblings)
            .is_err()
    );
}

#[test]
fn test_unsupported_version() {
    let mut raw = make_tex0(1, 8, 8, GxImageFormat::I8.level_len(8, 8));
    raw[8..12].copy_from_slice(&2u32.to_be_bytes());
    assert!(
        Tex0.open(&SharedBytes::new(raw), "grain", &NoSiblings)
            .is_err()
    );
}
