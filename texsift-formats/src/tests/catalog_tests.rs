use super::*;

fn catalog() -> FormatCatalog {
    FormatCatalog::standard()
}

#[test]
fn test_signature_beats_extension() {
    // Yaz0 bytes mislabeled as .bti must still identify as Yaz0
    let head = b"Yaz0\x00\x00\x10\x00";
    let info = catalog().identify(head, 0x1000, "bti");
    assert_eq!(info.extension, "szs");
    assert!(matches!(info.capability, Some(Capability::Compression(_))));
}

#[test]
fn test_extension_fallback() {
    // BTI has no magic; only the extension identifies it
    let head = [0u8; 0x20];
    let info = catalog().identify(&head, 0x20, "BTI");
    assert_eq!(info.extension, "bti");
    assert!(matches!(info.capability, Some(Capability::Texture(_))));
}

#[test]
fn test_unknown_payload_sniffs_printable_magic() {
    let info = catalog().identify(b"WXYZ rest of data", 17, "dat");
    assert!(info.is_unknown());
    assert_eq!(
        info.signature.as_ref().map(|s| s.display()),
        Some("WXYZ".to_string())
    );

    let blank = catalog().identify(&[0u8; 16], 16, "dat");
    assert!(blank.is_unknown());
    assert!(blank.signature.is_none());
}

#[test]
fn test_identify_is_stable() {
    let head = b"RARC\x00\x00\x01\x00";
    let a = catalog().identify(head, 256, "arc");
    let b = catalog().identify(head, 256, "arc");
    assert_eq!(a, b);
    assert_eq!(a.description, b.description);
}

#[test]
fn test_lz77_needs_type_byte() {
    let c = catalog();
    let good = c.identify(b"LZ77\x10\x00\x01\x00", 256, "");
    assert!(matches!(good.capability, Some(Capability::Compression(_))));

    // magic without the LZ10 type byte falls back to the sniffed unknown
    let bad = c.identify(b"LZ77\x40\x00\x01\x00", 256, "");
    assert!(bad.is_unknown());
}

#[test]
fn test_try_decompress_roundtrip() {
    let mut blob = Vec::new();
    blob.extend_from_slice(b"Yaz0");
    blob.extend_from_slice(&3u32.to_be_bytes());
    blob.extend_from_slice(&[0u8; 8]);
    blob.extend_from_slice(&[0xE0, b'h', b'i', b'!']);

    let (out, info) = catalog().try_decompress(&blob).unwrap();
    assert_eq!(out, b"hi!");
    assert_eq!(info.extension, "szs");

    assert!(catalog().try_decompress(b"plain old bytes").is_none());
}

#[test]
fn test_offset_signatures() {
    let mut disc = vec![0u8; 0x40];
    disc[0x1C..0x20].copy_from_slice(&[0xC2, 0x33, 0x9F, 0x3D]);
    let info = catalog().identify(&disc, 1 << 30, "");
    assert_eq!(info.extension, "gcm");
    assert_eq!(info.kind, FormatKind::Rom);
}

#[test]
fn test_catalog_breadth() {
    let c = catalog();
    assert!(c.formats().len() >= 50);
    // every opener-carrying descriptor can actually be identified somehow
    for f in c.formats() {
        if f.capability.is_some() {
            assert!(
                f.has_content_match() || !f.extension.is_empty(),
                "unreachable capability on {}",
                f.full_description()
            );
        }
    }
}
