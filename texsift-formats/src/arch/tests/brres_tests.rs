use super::*;

/// Build a minimal package: root group -> one named subgroup -> 16-byte
/// subfiles, every file carrying `file_magic` and a length of 16.
fn make_package(dir_name: &str, file_names: &[&str], file_magic: &[u8; 4]) -> Vec<u8> {
    let root_off = 0x10usize;
    let root_group = root_off + 8;
    let sub_group = root_group + 8 + 2 * 16;
    let strings = sub_group + 8 + (file_names.len() + 1) * 16;

    let mut names = Vec::new();
    let dir_name_off = strings;
    names.extend_from_slice(dir_name.as_bytes());
    names.push(0);
    let mut file_name_offs = Vec::new();
    for f in file_names {
        file_name_offs.push(strings + names.len());
        names.extend_from_slice(f.as_bytes());
        names.push(0);
    }
    let end_of_root = strings + names.len();
    let total = end_of_root + file_names.len() * 16;

    let mut v = vec![0u8; total];
    v[..4].copy_from_slice(b"bres");
    v[4..6].copy_from_slice(&0xFEFFu16.to_be_bytes());
    v[6..8].copy_from_slice(&3u16.to_be_bytes()); // version
    v[8..12].copy_from_slice(&(total as u32).to_be_bytes());
    v[12..14].copy_from_slice(&(root_off as u16).to_be_bytes());
    v[14..16].copy_from_slice(&1u16.to_be_bytes()); // section count

    v[root_off..root_off + 4].copy_from_slice(b"root");
    v[root_off + 4..root_off + 8].copy_from_slice(&((end_of_root - root_off) as u32).to_be_bytes());

    // root group: the reference entry plus one entry for the subgroup
    v[root_group..root_group + 4].copy_from_slice(&40u32.to_be_bytes());
    v[root_group + 4..root_group + 8].copy_from_slice(&1u32.to_be_bytes());
    let e1 = root_group + 8 + 16;
    v[e1 + 8..e1 + 12].copy_from_slice(&((dir_name_off - root_group) as u32).to_be_bytes());
    v[e1 + 12..e1 + 16].copy_from_slice(&((sub_group - root_group) as u32).to_be_bytes());

    v[sub_group..sub_group + 4]
        .copy_from_slice(&((8 + (file_names.len() + 1) * 16) as u32).to_be_bytes());
    v[sub_group + 4..sub_group + 8].copy_from_slice(&(file_names.len() as u32).to_be_bytes());
    for i in 0..file_names.len() {
        let e = sub_group + 8 + (i + 1) * 16;
        let file_off = end_of_root + i * 16;
        v[e + 8..e + 12].copy_from_slice(&((file_name_offs[i] - sub_group) as u32).to_be_bytes());
        v[e + 12..e + 16].copy_from_slice(&((file_off - sub_group) as u32).to_be_bytes());
    }

    v[strings..end_of_root].copy_from_slice(&names);

    for i in 0..file_names.len() {
        let off = end_of_root + i * 16;
        v[off..off + 4].copy_from_slice(file_magic);
        v[off + 4..off + 8].copy_from_slice(&16u32.to_be_bytes());
        v[off + 8] = i as u8; // tag so payloads are distinguishable
    }
    v
}

struct MapResolver(Vec<(String, SharedBytes)>);

impl SiblingResolver for MapResolver {
    fn request(&self, name: &str) -> Result<SharedBytes, FormatError> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, d)| d.clone())
            .ok_or_else(|| FormatError::MissingSibling(name.to_string()))
    }
}

#[test]
fn test_groups_become_dirs_and_duplicate_names_get_suffixes() {
    let raw = make_package("Textures(NW4R)", &["wood", "wood"], b"TEX0");
    let data = SharedBytes::new(raw);
    let tree = Brres.open(&data, "stage.brres", &NoSiblings).unwrap();

    let paths: Vec<String> = tree.files().map(|(id, _)| tree.path_of(id)).collect();
    assert_eq!(paths, vec!["Textures(NW4R)/wood", "Textures(NW4R)/wood_1"]);

    let payloads: Vec<u8> = tree
        .files()
        .map(|(_, n)| n.file_data().unwrap().as_slice()[8])
        .collect();
    assert_eq!(payloads, vec![0, 1]);
    for (_, n) in tree.files() {
        assert!(n.file_data().unwrap().as_slice().starts_with(b"TEX0"));
    }
}

#[test]
fn test_rasd_sections_are_skipped() {
    let raw = make_package("Sounds(NW4R)", &["step"], b"RASD");
    let data = SharedBytes::new(raw);
    let tree = Brres.open(&data, "stage.brres", &NoSiblings).unwrap();
    assert_eq!(tree.file_count(), 0);
}

#[test]
fn test_oversize_subfile_is_skipped() {
    let mut raw = make_package("Textures(NW4R)", &["wood"], b"TEX0");
    let file_off = raw.len() - 16;
    raw[file_off + 4..file_off + 8].copy_from_slice(&u32::MAX.to_be_bytes());
    let data = SharedBytes::new(raw);
    let tree = Brres.open(&data, "stage.brres", &NoSiblings).unwrap();
    assert_eq!(tree.file_count(), 0);
}

#[test]
fn test_brtex_pulls_palettes_from_brplt() {
    let brtex = SharedBytes::new(make_package("Textures(NW4R)", &["wood"], b"TEX0"));
    let brplt = SharedBytes::new(make_package("Palettes(NW4R)", &["wood"], b"PLT0"));
    let resolver = MapResolver(vec![("model.brplt".to_string(), brplt)]);

    let tree = Brres.open(&brtex, "model.brtex", &resolver).unwrap();
    let paths: Vec<String> = tree.files().map(|(id, _)| tree.path_of(id)).collect();
    assert_eq!(paths, vec!["Textures(NW4R)/wood", "Palettes(NW4R)/wood"]);
}

#[test]
fn test_missing_brplt_is_tolerated() {
    // texture-only package with no companion available still opens
    let raw = make_package("Textures(NW4R)", &["wood"], b"TEX0");
    let data = SharedBytes::new(raw);
    let tree = Brres.open(&data, "a.brtex", &NoSiblings).unwrap();
    assert_eq!(tree.file_count(), 1);
}

#[test]
fn test_rejects_bad_byte_order_mark() {
    let mut raw = make_package("Textures(NW4R)", &["wood"], b"TEX0");
    raw[4] = 0x12;
    raw[5] = 0x34;
    let data = SharedBytes::new(raw);
    assert!(Brres.open(&data, "stage.brres", &NoSiblings).is_err());
}
