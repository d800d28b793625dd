//! BRRES resource packages (`.brres`), NW4R index-group trees.
//!
//! The root section at `root_offset` holds nested index groups: `count + 1`
//! sixteen-byte entries per group (entry 0 is a search-tree reference with a
//! null name pointer). An entry whose data pointer lands past the end of the
//! root section is a subfile, read as a 4-byte magic plus u32 length;
//! anything inside the root section is another group and becomes a
//! directory. `.brtex` packages keep their palettes in a `.brplt` companion,
//! which is parsed and merged in when the resolver can supply it.

use texsift_core::archive::{ArchiveTree, NodeId, ROOT};
use texsift_core::util;
use texsift_core::{ArchiveOpener, FormatError, NoSiblings, SharedBytes, SiblingResolver};

const MAX_GROUP_ENTRIES: usize = 4096;
const MAX_GROUP_DEPTH: u32 = 8;

pub struct Brres;

impl ArchiveOpener for Brres {
    fn open(
        &self,
        data: &SharedBytes,
        name: &str,
        siblings: &dyn SiblingResolver,
    ) -> Result<ArchiveTree, FormatError> {
        let d = data.as_slice();
        if !d.starts_with(b"bres") {
            return Err(FormatError::invalid_identifier(
                "bres",
                util::read_ascii(d.get(..4).unwrap_or(d)),
            ));
        }
        let be = match util::read_u16_be(d, 4)? {
            0xFEFF => true,
            0xFFFE => false,
            bom => {
                return Err(FormatError::corrupt(format!(
                    "bad byte-order mark {bom:#06x}"
                )));
            }
        };
        let length = read_u32(d, 8, be)? as usize;
        let root_off = read_u16(d, 12, be)? as usize;

        if util::read_bytes(d, root_off, 4)? != b"root" {
            return Err(FormatError::corrupt("root section missing"));
        }
        let root_size = read_u32(d, root_off + 4, be)? as usize;
        let end_of_root = root_off + root_size;

        let mut tree = ArchiveTree::new();
        tree.bump_parsed_end(length.min(d.len()) as u64);
        read_group(d, data, root_off + 8, end_of_root, be, ROOT, 0, &mut tree)?;

        // Texture-only packages (.brtex) store their palettes in a matching
        // .brplt; merge its groups in so TEX0 entries can find their PLT0s.
        let root_children = tree.children(ROOT);
        let textures_only =
            root_children.len() == 1 && tree.node(root_children[0]).name == "Textures(NW4R)";
        if textures_only {
            let (stem, _) = util::split_name_ext(name);
            if let Ok(plt) = siblings.request(&format!("{stem}.brplt"))
                && let Ok(plt_tree) = self.open(&plt, &format!("{stem}.brplt"), &NoSiblings)
            {
                merge_into(&plt_tree, ROOT, &mut tree, ROOT);
            }
        }
        Ok(tree)
    }
}

fn read_u16(d: &[u8], off: usize, be: bool) -> Result<u16, FormatError> {
    if be {
        util::read_u16_be(d, off)
    } else {
        util::read_u16_le(d, off)
    }
}

fn read_u32(d: &[u8], off: usize, be: bool) -> Result<u32, FormatError> {
    if be {
        util::read_u32_be(d, off)
    } else {
        util::read_u32_le(d, off)
    }
}

#[allow(clippy::too_many_arguments)]
fn read_group(
    d: &[u8],
    data: &SharedBytes,
    group: usize,
    end_of_root: usize,
    be: bool,
    parent: NodeId,
    depth: u32,
    tree: &mut ArchiveTree,
) -> Result<(), FormatError> {
    if depth > MAX_GROUP_DEPTH {
        return Err(FormatError::corrupt("index group nesting too deep"));
    }
    let _group_size = read_u32(d, group, be)?;
    let count = read_u32(d, group + 4, be)? as usize;
    if count > MAX_GROUP_ENTRIES {
        return Err(FormatError::corrupt(format!(
            "implausible group entry count {count}"
        )));
    }
    // entry 0 is the search-tree reference; its name pointer is null
    for i in 0..=count {
        let entry = group + 8 + i * 16;
        let name_ptr = read_u32(d, entry + 8, be)? as usize;
        let data_ptr = read_u32(d, entry + 12, be)? as usize;
        if name_ptr == 0 || data_ptr == 0 {
            continue;
        }
        let entry_name = util::read_cstring(d, group + name_ptr)?;
        let target = group + data_ptr;

        if target >= end_of_root {
            // subfile: 4-byte magic then u32 section length
            let magic = util::read_bytes(d, target, 4)?;
            let file_len = read_u32(d, target + 4, be)? as usize;
            let fits = target.checked_add(file_len).is_some_and(|e| e <= d.len());
            if magic != b"RASD" && fits {
                let final_name = unique_name(tree, parent, &entry_name);
                tree.push_file(parent, &final_name, data.slice(target..target + file_len));
                tree.bump_parsed_end((target + file_len) as u64);
            }
        } else {
            let final_name = unique_name(tree, parent, &entry_name);
            let dir = tree.push_dir(parent, &final_name);
            read_group(d, data, target, end_of_root, be, dir, depth + 1, tree)?;
        }
    }
    Ok(())
}

/// Group entries occasionally repeat a name; later duplicates get an `_{n}`
/// suffix so tree paths stay unique.
fn unique_name(tree: &ArchiveTree, parent: NodeId, name: &str) -> String {
    if tree.child_named(parent, name).is_none() {
        return name.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{name}_{n}");
        if tree.child_named(parent, &candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

fn merge_into(src: &ArchiveTree, src_dir: NodeId, dst: &mut ArchiveTree, dst_dir: NodeId) {
    for &child in src.children(src_dir) {
        let node = src.node(child);
        if node.is_dir() {
            let sub = dst.push_dir(dst_dir, &node.name);
            merge_into(src, child, dst, sub);
        } else if let Some(bytes) = node.file_data() {
            dst.push_file(dst_dir, &node.name, bytes.clone());
        }
    }
}

#[cfg(test)]
#[path = "tests/brres_tests.rs"]
mod tests;
