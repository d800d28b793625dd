use super::*;
use texsift_core::NoSiblings;

fn make_nlcm(entries: &[(u32, u32)], reference: &str) -> Vec<u8> {
    let table = 0x40usize;
    let mut v = vec![0u8; table + entries.len() * 16];
    v[..4].copy_from_slice(b"NLCM");
    v[4..8].copy_from_slice(&(table as u32).to_be_bytes());
    v[12..16].copy_from_slice(&(entries.len() as u32).to_be_bytes());
    v[0x14..0x14 + reference.len()].copy_from_slice(reference.as_bytes());
    for (i, &(size, offset)) in entries.iter().enumerate() {
        let off = table + i * 16;
        v[off..off + 4].copy_from_slice(&size.to_be_bytes());
        v[off + 8..off + 12].copy_from_slice(&offset.to_be_bytes());
    }
    v
}

struct OneFile(String, SharedBytes);

impl SiblingResolver for OneFile {
    fn request(&self, name: &str) -> Result<SharedBytes, FormatError> {
        if self.0.eq_ignore_ascii_case(name) {
            Ok(self.1.clone())
        } else {
            Err(FormatError::MissingSibling(name.to_string()))
        }
    }
}

#[test]
fn test_entries_slice_the_companion() {
    let companion = SharedBytes::new(b"AAAABBBBBBCC".to_vec());
    let raw = make_nlcm(&[(4, 0), (6, 4), (2, 10)], "data.bin");
    let data = SharedBytes::new(raw);
    let resolver = OneFile("data.bin".to_string(), companion);

    let tree = Nlcm.open(&data, "header.bin", &resolver).unwrap();
    assert_eq!(tree.file_count(), 3);

    let got: Vec<(String, Vec<u8>)> = tree
        .files()
        .map(|(id, n)| {
            (
                tree.path_of(id),
                n.file_data().unwrap().as_slice().to_vec(),
            )
        })
        .collect();
    assert_eq!(got[0], ("0".to_string(), b"AAAA".to_vec()));
    assert_eq!(got[1], ("1".to_string(), b"BBBBBB".to_vec()));
    assert_eq!(got[2], ("2".to_string(), b"CC".to_vec()));
}

#[test]
fn test_missing_companion_is_an_error() {
    let raw = make_nlcm(&[(4, 0)], "data.bin");
    let data = SharedBytes::new(raw);
    let err = Nlcm.open(&data, "header.bin", &NoSiblings).unwrap_err();
    assert!(matches!(err, FormatError::MissingSibling(n) if n == "data.bin"));
}

#[test]
fn test_entry_past_companion_end_is_an_error() {
    let companion = SharedBytes::new(vec![0u8; 8]);
    let raw = make_nlcm(&[(16, 0)], "data.bin");
    let data = SharedBytes::new(raw);
    let resolver = OneFile("data.bin".to_string(), companion);
    assert!(Nlcm.open(&data, "header.bin", &resolver).is_err());
}
