//! Arena-backed container trees.
//!
//! All entries live in one `Vec`; parent/child links are indices. Trees are
//! built once by an opener and then only read, so no interior mutability is
//! needed anywhere.

use crate::bytes::SharedBytes;

/// Index of a node within its [`ArchiveTree`].
pub type NodeId = usize;

/// The root directory node every tree starts with.
pub const ROOT: NodeId = 0;

#[derive(Debug)]
pub struct ArchiveNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub payload: NodePayload,
}

#[derive(Debug)]
pub enum NodePayload {
    Dir { children: Vec<NodeId> },
    File { data: SharedBytes },
}

impl ArchiveNode {
    pub fn is_dir(&self) -> bool {
        matches!(self.payload, NodePayload::Dir { .. })
    }

    pub fn file_data(&self) -> Option<&SharedBytes> {
        match &self.payload {
            NodePayload::File { data } => Some(data),
            NodePayload::Dir { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct ArchiveTree {
    nodes: Vec<ArchiveNode>,
    parsed_end: u64,
}

impl ArchiveTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![ArchiveNode {
                name: String::new(),
                parent: None,
                payload: NodePayload::Dir {
                    children: Vec::new(),
                },
            }],
            parsed_end: 0,
        }
    }

    pub fn push_dir(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push_node(parent, name, NodePayload::Dir {
            children: Vec::new(),
        })
    }

    pub fn push_file(&mut self, parent: NodeId, name: &str, data: SharedBytes) -> NodeId {
        self.push_node(parent, name, NodePayload::File { data })
    }

    fn push_node(&mut self, parent: NodeId, name: &str, payload: NodePayload) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ArchiveNode {
            name: name.to_string(),
            parent: Some(parent),
            payload,
        });
        if let NodePayload::Dir { children } = &mut self.nodes[parent].payload {
            children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &ArchiveNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }

    /// All file nodes, in insertion order (openers insert in layout order).
    pub fn files(&self) -> impl Iterator<Item = (NodeId, &ArchiveNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_dir())
    }

    /// Cumulative byte size of every file in the tree.
    pub fn total_size(&self) -> u64 {
        self.files()
            .filter_map(|(_, n)| n.file_data())
            .map(|d| d.len() as u64)
            .sum()
    }

    /// Child node ids of a directory (empty for files).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id].payload {
            NodePayload::Dir { children } => children,
            NodePayload::File { .. } => &[],
        }
    }

    /// Exact-name child lookup within one directory.
    pub fn child_named(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.children(dir)
            .iter()
            .copied()
            .find(|&c| self.nodes[c].name == name)
    }

    /// Path of a node inside the tree, directories joined with `/`.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(i) = cur {
            let node = &self.nodes[i];
            if !node.name.is_empty() {
                parts.push(node.name.as_str());
            }
            cur = node.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// Case-insensitive companion lookup: the siblings of `of` first, then
    /// anywhere in the tree. `of` itself never matches, so a palette request
    /// cannot resolve to the texture that issued it.
    pub fn sibling(&self, of: NodeId, name: &str) -> Option<&SharedBytes> {
        if let Some(parent) = self.nodes[of].parent
            && let NodePayload::Dir { children } = &self.nodes[parent].payload
        {
            for &c in children {
                if c != of
                    && self.nodes[c].name.eq_ignore_ascii_case(name)
                    && let Some(data) = self.nodes[c].file_data()
                {
                    return Some(data);
                }
            }
        }
        self.files()
            .find(|(id, n)| *id != of && n.name.eq_ignore_ascii_case(name))
            .and_then(|(_, n)| n.file_data())
    }

    /// Highest source offset an opener consumed while parsing. Drives the
    /// trailing-data scan after extraction.
    pub fn parsed_end(&self) -> u64 {
        self.parsed_end
    }

    pub fn bump_parsed_end(&mut self, offset: u64) {
        self.parsed_end = self.parsed_end.max(offset);
    }
}

impl Default for ArchiveTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(v: &[u8]) -> SharedBytes {
        SharedBytes::new(v.to_vec())
    }

    #[test]
    fn test_build_and_walk() {
        let mut t = ArchiveTree::new();
        let d = t.push_dir(ROOT, "sub");
        t.push_file(ROOT, "a.tpl", bytes(&[1, 2, 3]));
        t.push_file(d, "b.bti", bytes(&[4, 5]));

        assert_eq!(t.file_count(), 2);
        assert_eq!(t.total_size(), 5);
        let paths: Vec<String> = t.files().map(|(id, _)| t.path_of(id)).collect();
        assert_eq!(paths, vec!["a.tpl", "sub/b.bti"]);
    }

    #[test]
    fn test_sibling_lookup() {
        let mut t = ArchiveTree::new();
        let d = t.push_dir(ROOT, "dir");
        let inner = t.push_file(d, "table.bin", bytes(&[0]));
        t.push_file(d, "DATA.BIN", bytes(&[9, 9]));
        t.push_file(ROOT, "other.bin", bytes(&[7]));

        assert_eq!(t.sibling(inner, "data.bin").map(|d| d.len()), Some(2));
        // falls back to a whole-tree search
        assert_eq!(t.sibling(inner, "other.bin").map(|d| d.len()), Some(1));
        assert!(t.sibling(inner, "missing.bin").is_none());
    }

    #[test]
    fn test_parsed_end_watermark() {
        let mut t = ArchiveTree::new();
        t.bump_parsed_end(100);
        t.bump_parsed_end(50);
        assert_eq!(t.parsed_end(), 100);
    }
}
