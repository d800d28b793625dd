use super::*;
use texsift_core::NoSiblings;

const IMAGE_HDR: usize = 0x14;

/// Start a one-image TPL: header + offset table + zeroed image header.
fn tpl_shell(extra: usize) -> Vec<u8> {
    let mut v = vec![0u8; IMAGE_HDR + 36 + extra];
    v[0..4].copy_from_slice(&TPL_MAGIC.to_be_bytes());
    v[4..8].copy_from_slice(&1u32.to_be_bytes());
    v[8..12].copy_from_slice(&12u32.to_be_bytes());
    v[12..16].copy_from_slice(&(IMAGE_HDR as u32).to_be_bytes());
    v
}

fn set_image(v: &mut [u8], width: u16, height: u16, format: u32, data_off: u32, max_lod: u8) {
    v[IMAGE_HDR..IMAGE_HDR + 2].copy_from_slice(&height.to_be_bytes());
    v[IMAGE_HDR + 2..IMAGE_HDR + 4].copy_from_slice(&width.to_be_bytes());
    v[IMAGE_HDR + 4..IMAGE_HDR + 8].copy_from_slice(&format.to_be_bytes());
    v[IMAGE_HDR + 8..IMAGE_HDR + 12].copy_from_slice(&data_off.to_be_bytes());
    v[IMAGE_HDR + 12..IMAGE_HDR + 16].copy_from_slice(&1u32.to_be_bytes()); // wrap_s repeat
    v[IMAGE_HDR + 34] = max_lod;
}

#[test]
fn test_rgb565_image() {
    let data_off = IMAGE_HDR + 36;
    let mut v = tpl_shell(32);
    set_image(&mut v, 4, 4, 4, data_off as u32, 0);
    for px in 0..16 {
        v[data_off + px * 2..data_off + px * 2 + 2].copy_from_slice(&0xF800u16.to_be_bytes());
    }

    let entries = Tpl
        .open(&SharedBytes::new(v), "a.tpl", &NoSiblings)
        .unwrap();
    assert_eq!(entries.len(), 1);
    let e = &entries[0];
    assert_eq!((e.width, e.height), (4, 4));
    assert_eq!(e.format, GxImageFormat::Rgb565);
    assert_eq!(e.wrap_s, WrapMode::Repeat);
    assert_eq!(e.wrap_t, WrapMode::Clamp);

    let decoded = e.decode_level(0, 0).unwrap();
    assert_eq!(&decoded.rgba[..4], &[255, 0, 0, 255]);
}

#[test]
fn test_c8_image_with_palette() {
    let pal_hdr = IMAGE_HDR + 36;
    let data_off = pal_hdr + 12;
    let pal_data = data_off + 32;
    let mut v = tpl_shell(12 + 32 + 8);
    v[16..20].copy_from_slice(&(pal_hdr as u32).to_be_bytes());
    set_image(&mut v, 8, 4, 9, data_off as u32, 0); // C8, one 8x4 block

    v[pal_hdr..pal_hdr + 2].copy_from_slice(&4u16.to_be_bytes()); // entries
    v[pal_hdr + 4..pal_hdr + 8].copy_from_slice(&1u32.to_be_bytes()); // RGB565 TLUT
    v[pal_hdr + 8..pal_hdr + 12].copy_from_slice(&(pal_data as u32).to_be_bytes());

    for px in 0..32 {
        v[data_off + px] = 2;
    }
    v[pal_data + 4..pal_data + 6].copy_from_slice(&0x07E0u16.to_be_bytes()); // entry 2: green

    let entries = Tpl
        .open(&SharedBytes::new(v), "a.tpl", &NoSiblings)
        .unwrap();
    let e = &entries[0];
    assert_eq!(e.format, GxImageFormat::C8);
    assert_eq!(e.palette_format, GxPaletteFormat::Rgb565);
    assert_eq!(e.palettes.len(), 1);
    assert_eq!(e.palettes[0].len(), 8);

    let decoded = e.decode_level(0, 0).unwrap();
    assert_eq!(&decoded.rgba[..4], &[0, 255, 0, 255]);
}

#[test]
fn test_mip_chain_lengths() {
    // I4 8x8 with one extra level: 32 bytes per level (4x4 still rounds up
    // to one 8x8 block)
    let data_off = IMAGE_HDR + 36;
    let mut v = tpl_shell(64);
    set_image(&mut v, 8, 8, 0, data_off as u32, 1);

    let entries = Tpl
        .open(&SharedBytes::new(v), "a.tpl", &NoSiblings)
        .unwrap();
    let e = &entries[0];
    assert_eq!(e.mip_count(), 2);
    assert_eq!(e.level_dims(1), (4, 4));
    assert_eq!(e.levels[1].len(), 32);
    assert_eq!(e.max_lod, 1.0);
}

#[test]
fn test_truncated_level_data_is_an_error() {
    let data_off = IMAGE_HDR + 36;
    let mut v = tpl_shell(16); // RGB565 4x4 needs 32
    set_image(&mut v, 4, 4, 4, data_off as u32, 0);
    assert!(
        Tpl.open(&SharedBytes::new(v), "a.tpl", &NoSiblings)
            .is_err()
    );
}

#[test]
fn test_palette_format_without_palette_is_an_error() {
    let data_off = IMAGE_HDR + 36;
    let mut v = tpl_shell(32);
    set_image(&mut v, 8, 4, 9, data_off as u32, 0); // C8, palette offset 0
    assert!(
        Tpl.open(&SharedBytes::new(v), "a.tpl", &NoSiblings)
            .is_err()
    );
}
