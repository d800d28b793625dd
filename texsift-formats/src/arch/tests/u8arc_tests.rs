use super::*;
use texsift_core::NoSiblings;

/// Build a U8 archive: root -> { "menu/" -> "bg.tpl", "opening.bti" }.
fn make_u8() -> Vec<u8> {
    let names = b"\0menu\0bg.tpl\0opening.bti\0";
    let table = 0x20;
    let node_count = 4;
    let strings = table + node_count * 12;
    let data_start = strings + names.len();

    let mut v = vec![0u8; strings];
    v[..4].copy_from_slice(&U8_MAGIC);
    v[4..8].copy_from_slice(&(table as u32).to_be_bytes());
    // header size and data offset fields
    v[8..12].copy_from_slice(&((node_count * 12 + names.len()) as u32).to_be_bytes());
    v[12..16].copy_from_slice(&(data_start as u32).to_be_bytes());

    let payload_a = b"TPLDATA!";
    let payload_b = b"BTI";
    let off_a = data_start;
    let off_b = off_a + payload_a.len();

    let mut node = |i: usize, kind: u8, name_off: u32, data: u32, size: u32| {
        let off = table + i * 12;
        v[off] = kind;
        v[off + 1..off + 4].copy_from_slice(&name_off.to_be_bytes()[1..]);
        v[off + 4..off + 8].copy_from_slice(&data.to_be_bytes());
        v[off + 8..off + 12].copy_from_slice(&size.to_be_bytes());
    };
    node(0, 1, 0, 0, node_count as u32); // root
    node(1, 1, 1, 0, 3); // "menu", children end at index 3
    node(2, 0, 6, off_a as u32, payload_a.len() as u32); // "bg.tpl"
    node(3, 0, 13, off_b as u32, payload_b.len() as u32); // "opening.bti"

    v.extend_from_slice(names);
    v.extend_from_slice(payload_a);
    v.extend_from_slice(payload_b);
    v
}

#[test]
fn test_open_nested_layout() {
    let data = SharedBytes::new(make_u8());
    let tree = U8Arc.open(&data, "test.arc", &NoSiblings).unwrap();

    assert_eq!(tree.file_count(), 2);
    let paths: Vec<String> = tree.files().map(|(id, _)| tree.path_of(id)).collect();
    assert_eq!(paths, vec!["menu/bg.tpl", "opening.bti"]);

    let (_, bg) = tree.files().next().unwrap();
    assert_eq!(bg.file_data().unwrap().as_slice(), b"TPLDATA!");
}

#[test]
fn test_parsed_end_covers_file_data() {
    let raw = make_u8();
    let total = raw.len() as u64;
    let data = SharedBytes::new(raw);
    let tree = U8Arc.open(&data, "test.arc", &NoSiblings).unwrap();
    assert_eq!(tree.parsed_end(), total);
}

#[test]
fn test_rejects_bad_magic() {
    let mut raw = make_u8();
    raw[0] = 0;
    let data = SharedBytes::new(raw);
    assert!(U8Arc.open(&data, "test.arc", &NoSiblings).is_err());
}

#[test]
fn test_rejects_file_past_end() {
    let mut raw = make_u8();
    // blow up the size of "opening.bti"
    let off = 0x20 + 3 * 12 + 8;
    raw[off..off + 4].copy_from_slice(&0xFFFF_0000u32.to_be_bytes());
    let data = SharedBytes::new(raw);
    assert!(U8Arc.open(&data, "test.arc", &NoSiblings).is_err());
}
