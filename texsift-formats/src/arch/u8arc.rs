//! U8 archives (`.arc`, `.app`), the standard Wii bundle format.
//!
//! A flat node table follows the header: 12 bytes per node, type 0 for files
//! and 1 for directories. Directory nodes store the index one past their last
//! child, so nesting is reconstructed with an end-index stack. The string
//! pool sits directly after the table; all offsets are absolute.

use texsift_core::archive::{ArchiveTree, NodeId, ROOT};
use texsift_core::util;
use texsift_core::{ArchiveOpener, FormatError, SharedBytes, SiblingResolver};

pub const U8_MAGIC: [u8; 4] = [0x55, 0xAA, 0x38, 0x2D];

const NODE_LEN: usize = 12;
const MAX_NODES: usize = 1 << 20;

pub struct U8Arc;

struct RawNode {
    kind: u8,
    name_off: usize,
    data: u32,
    size: u32,
}

fn raw_node(d: &[u8], table: usize, index: usize) -> Result<RawNode, FormatError> {
    let off = table + index * NODE_LEN;
    Ok(RawNode {
        kind: util::read_u8(d, off)?,
        name_off: util::read_u24_be(d, off + 1)? as usize,
        data: util::read_u32_be(d, off + 4)?,
        size: util::read_u32_be(d, off + 8)?,
    })
}

impl ArchiveOpener for U8Arc {
    fn open(
        &self,
        data: &SharedBytes,
        _name: &str,
        _siblings: &dyn SiblingResolver,
    ) -> Result<ArchiveTree, FormatError> {
        let d = data.as_slice();
        if !d.starts_with(&U8_MAGIC) {
            return Err(FormatError::invalid_identifier(
                "U8",
                util::read_ascii(d.get(..4).unwrap_or(d)),
            ));
        }
        let table = util::read_u32_be(d, 4)? as usize;
        // header size (u32 @ 8) and data offset (u32 @ 12) are informational

        let root = raw_node(d, table, 0)?;
        if root.kind != 1 {
            return Err(FormatError::corrupt("root node is not a directory"));
        }
        let count = root.size as usize;
        if count == 0 || count > MAX_NODES {
            return Err(FormatError::corrupt(format!("implausible node count {count}")));
        }
        let strings = table + count * NODE_LEN;

        let mut tree = ArchiveTree::new();
        tree.bump_parsed_end(strings as u64);

        // (directory id, index one past its last child)
        let mut stack: Vec<(NodeId, usize)> = vec![(ROOT, count)];
        for i in 1..count {
            while stack.len() > 1 && i >= stack[stack.len() - 1].1 {
                stack.pop();
            }
            let node = raw_node(d, table, i)?;
            let parent = stack[stack.len() - 1].0;
            let name = util::read_cstring(d, strings + node.name_off)?;
            if node.kind == 1 {
                let id = tree.push_dir(parent, &name);
                stack.push((id, (node.size as usize).min(count)));
            } else {
                let start = node.data as usize;
                let end = start
                    .checked_add(node.size as usize)
                    .filter(|&e| e <= d.len())
                    .ok_or_else(|| FormatError::corrupt("file data out of range"))?;
                tree.push_file(parent, &name, data.slice(start..end));
                tree.bump_parsed_end(end as u64);
            }
        }
        Ok(tree)
    }
}

#[cfg(test)]
#[path = "tests/u8arc_tests.rs"]
mod tests;
