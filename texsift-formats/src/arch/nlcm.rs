//! NLCM table archives (Rune Factory / NeverLand games).
//!
//! The NLCM file is only an index: a header naming a companion data file,
//! then 16-byte entries of `{size, pad, offset, pad}` slicing that companion.
//! Entries have no names of their own and are exposed by index.

use texsift_core::archive::{ArchiveTree, ROOT};
use texsift_core::util;
use texsift_core::{ArchiveOpener, FormatError, SharedBytes, SiblingResolver};

const ENTRY_LEN: usize = 16;
const MAX_ENTRIES: usize = 1 << 20;

pub struct Nlcm;

impl ArchiveOpener for Nlcm {
    fn open(
        &self,
        data: &SharedBytes,
        _name: &str,
        siblings: &dyn SiblingResolver,
    ) -> Result<ArchiveTree, FormatError> {
        let d = data.as_slice();
        if !d.starts_with(b"NLCM") {
            return Err(FormatError::invalid_identifier(
                "NLCM",
                util::read_ascii(d.get(..4).unwrap_or(d)),
            ));
        }
        let table = util::read_u32_be(d, 4)? as usize;
        let count = util::read_u32_be(d, 12)? as usize;
        let reference = util::read_cstring(d, 0x14)?;
        if count > MAX_ENTRIES {
            return Err(FormatError::corrupt(format!(
                "implausible entry count {count}"
            )));
        }
        if reference.is_empty() {
            return Err(FormatError::corrupt("empty companion file name"));
        }

        let payload = siblings.request(&reference)?;
        let mut tree = ArchiveTree::new();
        for i in 0..count {
            let entry = table + i * ENTRY_LEN;
            let size = util::read_u32_be(d, entry)? as usize;
            let offset = util::read_u32_be(d, entry + 8)? as usize;
            let end = offset
                .checked_add(size)
                .filter(|&e| e <= payload.len())
                .ok_or_else(|| FormatError::corrupt("entry outside companion file"))?;
            tree.push_file(ROOT, &i.to_string(), payload.slice(offset..end));
        }
        tree.bump_parsed_end((table + count * ENTRY_LEN) as u64);
        Ok(tree)
    }
}

#[cfg(test)]
#[path = "tests/nlcm_tests.rs"]
mod tests;
