//! Signature cutting: carve an unidentified payload into pieces at every
//! known magic found inside it.
//!
//! Each hit starts a piece that runs to the next hit (or the end), named
//! `{index:04}.{ext}` after the format whose signature opened it. Pieces
//! over-approximate the real member size; the rescan of each piece sorts
//! that out.

use texsift_core::archive::ROOT;
use texsift_core::{ArchiveTree, FormatInfo, SharedBytes};

// Short magics false-positive too often to cut on.
const MIN_SIGNATURE_LEN: usize = 4;

pub(crate) fn cut(data: &SharedBytes, formats: &[FormatInfo]) -> ArchiveTree {
    let bytes = data.as_slice();
    let mut marks: Vec<(usize, &FormatInfo)> = Vec::new();
    for info in formats {
        let Some(sig) = &info.signature else { continue };
        if sig.bytes().len() < MIN_SIGNATURE_LEN {
            continue;
        }
        let mut from = 0;
        while let Some(pos) = find(bytes, sig.bytes(), from) {
            from = pos + 1;
            // The piece starts where the member starts, not where the
            // magic sits.
            let Some(start) = pos.checked_sub(sig.offset()) else {
                continue;
            };
            marks.push((start, info));
        }
    }
    marks.sort_by_key(|m| m.0);
    marks.dedup_by_key(|m| m.0);

    let mut tree = ArchiveTree::new();
    if marks.is_empty() {
        return tree;
    }
    for (i, (start, info)) in marks.iter().enumerate() {
        let end = marks.get(i + 1).map_or(data.len(), |m| m.0);
        let name = if info.extension.is_empty() {
            format!("{i:04}")
        } else {
            format!("{i:04}.{}", info.extension)
        };
        tree.push_file(ROOT, &name, data.slice(*start..end));
    }
    tree.bump_parsed_end(data.len() as u64);
    tree
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack[from.min(haystack.len())..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}
