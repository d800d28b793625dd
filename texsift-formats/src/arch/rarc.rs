//! RARC resource archives (`.arc`), the JSystem bundle of the GameCube era.
//!
//! After the 0x20-byte header comes an info block holding a directory-node
//! table (16 bytes each) and a file-entry table (20 bytes each). Entry type
//! bit 0x0200 marks a subdirectory reference whose data field is a directory
//! index; anything else is a file whose data field is an offset into the
//! payload region. `.` and `..` entries are skipped, and already-visited
//! directories are never descended into twice.

use texsift_core::archive::{ArchiveTree, NodeId, ROOT};
use texsift_core::util;
use texsift_core::{ArchiveOpener, FormatError, SharedBytes, SiblingResolver};

const HEADER_LEN: usize = 0x20;
const DIR_NODE_LEN: usize = 16;
const FILE_ENTRY_LEN: usize = 20;
const TYPE_DIR: u16 = 0x0200;

pub struct Rarc;

struct Layout {
    dir_count: usize,
    dir_table: usize,
    file_table: usize,
    strings: usize,
    data_base: usize,
}

impl ArchiveOpener for Rarc {
    fn open(
        &self,
        data: &SharedBytes,
        _name: &str,
        _siblings: &dyn SiblingResolver,
    ) -> Result<ArchiveTree, FormatError> {
        let d = data.as_slice();
        if !d.starts_with(b"RARC") {
            return Err(FormatError::invalid_identifier(
                "RARC",
                util::read_ascii(d.get(..4).unwrap_or(d)),
            ));
        }
        // header: u32 file size @ 4, u32 header size @ 8, u32 data start @ 12
        let data_start = util::read_u32_be(d, 12)? as usize;
        // info block offsets are relative to the header end
        let dir_count = util::read_u32_be(d, HEADER_LEN)? as usize;
        let dir_table = HEADER_LEN + util::read_u32_be(d, HEADER_LEN + 4)? as usize;
        let _file_count = util::read_u32_be(d, HEADER_LEN + 8)?;
        let file_table = HEADER_LEN + util::read_u32_be(d, HEADER_LEN + 12)? as usize;
        let strings = HEADER_LEN + util::read_u32_be(d, HEADER_LEN + 20)? as usize;
        let data_base = HEADER_LEN + data_start;

        if dir_count == 0 || dir_count > 1 << 16 {
            return Err(FormatError::corrupt(format!(
                "implausible directory count {dir_count}"
            )));
        }
        let layout = Layout {
            dir_count,
            dir_table,
            file_table,
            strings,
            data_base,
        };

        let mut tree = ArchiveTree::new();
        tree.bump_parsed_end(data_base as u64);
        let mut visited = vec![false; dir_count];
        walk_dir(d, data, &layout, 0, ROOT, 0, &mut tree, &mut visited)?;
        Ok(tree)
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_dir(
    d: &[u8],
    data: &SharedBytes,
    layout: &Layout,
    dir_index: usize,
    parent: NodeId,
    depth: u32,
    tree: &mut ArchiveTree,
    visited: &mut [bool],
) -> Result<(), FormatError> {
    if depth > 128 {
        return Err(FormatError::corrupt("directory nesting too deep"));
    }
    if dir_index >= layout.dir_count || visited[dir_index] {
        return Ok(());
    }
    visited[dir_index] = true;

    let node = layout.dir_table + dir_index * DIR_NODE_LEN;
    let first = util::read_u32_be(d, node + 12)? as usize;
    let count = util::read_u16_be(d, node + 10)? as usize;

    for e in first..first + count {
        let entry = layout.file_table + e * FILE_ENTRY_LEN;
        let etype = util::read_u16_be(d, entry + 4)?;
        let name_off = util::read_u16_be(d, entry + 6)? as usize;
        let value = util::read_u32_be(d, entry + 8)? as usize;
        let size = util::read_u32_be(d, entry + 12)? as usize;

        let name = util::read_cstring(d, layout.strings + name_off)?;
        if name == "." || name == ".." {
            continue;
        }

        if etype & TYPE_DIR != 0 {
            let id = tree.push_dir(parent, &name);
            walk_dir(d, data, layout, value, id, depth + 1, tree, visited)?;
        } else {
            let start = layout.data_base + value;
            let end = start
                .checked_add(size)
                .filter(|&e| e <= d.len())
                .ok_or_else(|| FormatError::corrupt("file data out of range"))?;
            tree.push_file(parent, &name, data.slice(start..end));
            tree.bump_parsed_end(end as u64);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/rarc_tests.rs"]
mod tests;
