use super::*;
use texsift_core::NoSiblings;

fn make_tex(format_id: u32, width: u32, height: u32, pixel_len: usize) -> Vec<u8> {
    let mut v = vec![0u8; HEADER_LEN + pixel_len];
    v[0..4].copy_from_slice(&format_id.to_be_bytes());
    v[4..8].copy_from_slice(&width.to_be_bytes());
    v[8..12].copy_from_slice(&height.to_be_bytes());
    v
}

#[test]
fn test_matcher_needs_extension_and_header() {
    let raw = make_tex(0x4B, 8, 8, GxImageFormat::Ia8.level_len(8, 8));
    let len = raw.len() as u64;

    assert!(tex_matcher(&raw, len, "tex"));
    assert!(tex_matcher(&raw, len, "TEX"));
    assert!(tex_matcher(&raw, len, "tex1")); // prefix extensions count
    assert!(!tex_matcher(&raw, len, "bin"));
    // truncated payload
    assert!(!tex_matcher(&raw, 16, "tex"));
    // unknown format id
    let bad = make_tex(0x77, 8, 8, 128);
    assert!(!tex_matcher(&bad, bad.len() as u64, "tex"));
    // width 1 is below the plausibility floor
    let thin = make_tex(0x4B, 1, 8, 128);
    assert!(!tex_matcher(&thin, thin.len() as u64, "tex"));
}

#[test]
fn test_open_ia8() {
    let pixel_len = GxImageFormat::Ia8.level_len(4, 4);
    let mut raw = make_tex(0x4B, 4, 4, pixel_len);
    for px in 0..16 {
        // A=0xFF, I=0x40
        raw[HEADER_LEN + px * 2] = 0xFF;
        raw[HEADER_LEN + px * 2 + 1] = 0x40;
    }

    let entries = TexFile
        .open(&SharedBytes::new(raw), "a.tex", &NoSiblings)
        .unwrap();
    assert_eq!(entries.len(), 1);
    let e = &entries[0];
    assert_eq!(e.format, GxImageFormat::Ia8);
    assert_eq!(e.mip_count(), 1);

    let decoded = e.decode_level(0, 0).unwrap();
    assert_eq!(&decoded.rgba[..4], &[0x40, 0x40, 0x40, 0xFF]);
}

#[test]
fn test_open_rejects_unknown_format() {
    let raw = make_tex(0x33, 4, 4, 64);
    assert!(
        TexFile
            .open(&SharedBytes::new(raw), "a.tex", &NoSiblings)
            .is_err()
    );
}
