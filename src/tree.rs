//! Arena-backed directory tree of archive entries.
//!
//! Every archive owns one [`EntryTree`]. Nodes are addressed by [`EntryId`]
//! values allocated from a per-tree counter that never hands out the same id
//! twice, so an id held after its entry was removed can never alias a newer
//! entry. Directory nodes own an ordered child list; file nodes own their
//! bytes.
//!
//! Name lookups are ASCII case-insensitive, matching how game engines resolve
//! lump and resource names.

use std::fmt;

use crate::{EntryPath, Error, Result};

/// Identity of a node within one [`EntryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u32);

impl EntryId {
    /// Creates an id from its raw value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this id.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contents of a tree node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A directory and its children, in insertion order.
    Dir {
        /// Child node ids.
        children: Vec<EntryId>,
    },
    /// A file and its bytes.
    File {
        /// Entry content.
        data: Vec<u8>,
    },
}

/// A single entry or directory in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<EntryId>,
    kind: NodeKind,
}

impl Node {
    /// Returns the node's own name (last path segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the directory containing this node (`None` for the root).
    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    /// Returns `true` if this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir { .. })
    }

    /// Returns the file bytes, or `None` for a directory.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::File { data } => Some(data),
            NodeKind::Dir { .. } => None,
        }
    }

    /// Returns the file size in bytes (0 for directories).
    pub fn size(&self) -> usize {
        self.data().map_or(0, <[u8]>::len)
    }

    /// Returns the children of a directory (empty for files).
    pub fn children(&self) -> &[EntryId] {
        match &self.kind {
            NodeKind::Dir { children } => children,
            NodeKind::File { .. } => &[],
        }
    }

    /// Returns the node kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// Directory tree of an archive's entries.
#[derive(Debug, Clone)]
pub struct EntryTree {
    nodes: Vec<Option<Node>>,
    root: EntryId,
}

impl Default for EntryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryTree {
    /// Creates a tree holding only the (unnamed) root directory.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node {
                name: String::new(),
                parent: None,
                kind: NodeKind::Dir {
                    children: Vec::new(),
                },
            })],
            root: EntryId(0),
        }
    }

    /// Returns the root directory id.
    pub fn root(&self) -> EntryId {
        self.root
    }

    /// Returns the number of live nodes, excluding the root.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count() - 1
    }

    /// Returns `true` if the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the node with the given id.
    pub fn get(&self, id: EntryId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: EntryId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Returns `true` if the id names a live node.
    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Returns `true` if the id names a live directory.
    pub fn is_dir(&self, id: EntryId) -> bool {
        self.get(id).is_some_and(Node::is_dir)
    }

    /// Returns the bytes of a file node.
    pub fn data(&self, id: EntryId) -> Option<&[u8]> {
        self.get(id).and_then(Node::data)
    }

    /// Replaces the bytes of a file node.
    pub fn set_data(&mut self, id: EntryId, bytes: Vec<u8>) -> Result<()> {
        match self.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::File { data }) => {
                *data = bytes;
                Ok(())
            }
            Some(NodeKind::Dir { .. }) => Err(Error::EntryNotFound {
                path: format!("{} is a directory", id),
            }),
            None => Err(Error::EntryNotFound {
                path: id.to_string(),
            }),
        }
    }

    /// Returns the children of a directory.
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        self.get(id).map_or(&[], Node::children)
    }

    /// Returns the directory containing `id`.
    pub fn parent_dir(&self, id: EntryId) -> Option<EntryId> {
        self.get(id).and_then(Node::parent)
    }

    /// Iterates the directories above `id`, innermost first, stopping before
    /// the root.
    pub fn ancestors(&self, id: EntryId) -> impl Iterator<Item = EntryId> + '_ {
        let root = self.root;
        std::iter::successors(self.parent_dir(id), move |&dir| self.parent_dir(dir))
            .take_while(move |&dir| dir != root)
    }

    /// Returns `true` if `id` lies somewhere below directory `dir`.
    pub fn is_within(&self, id: EntryId, dir: EntryId) -> bool {
        dir == self.root || self.ancestors(id).any(|ancestor| ancestor == dir)
    }

    /// Returns the full path of a node (empty for the root).
    pub fn path_of(&self, id: EntryId) -> Option<String> {
        let node = self.get(id)?;
        let mut segments = vec![node.name.as_str()];
        for dir in self.ancestors(id) {
            segments.push(self.get(dir)?.name.as_str());
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Returns the name of the top-level directory containing `id`.
    ///
    /// Files at the root have no namespace.
    pub fn namespace_of(&self, id: EntryId) -> Option<&str> {
        let top = self.ancestors(id).last()?;
        self.get(top).map(Node::name)
    }

    fn allocate(&mut self, node: Node) -> EntryId {
        let id = EntryId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    fn child_named(&self, dir: EntryId, name: &str, want_dir: bool) -> Option<EntryId> {
        self.children(dir).iter().copied().find(|&child| {
            self.get(child)
                .is_some_and(|n| n.is_dir() == want_dir && n.name.eq_ignore_ascii_case(name))
        })
    }

    fn insert(&mut self, dir: EntryId, name: &str, kind: NodeKind) -> EntryId {
        let id = self.allocate(Node {
            name: name.to_string(),
            parent: Some(dir),
            kind,
        });
        if let Some(NodeKind::Dir { children }) = self.get_mut(dir).map(|n| &mut n.kind) {
            children.push(id);
        }
        id
    }

    fn ensure_dirs<'p>(&mut self, segments: impl Iterator<Item = &'p str>) -> EntryId {
        let mut dir = self.root;
        for segment in segments {
            dir = match self.child_named(dir, segment, true) {
                Some(existing) => existing,
                None => self.insert(
                    dir,
                    segment,
                    NodeKind::Dir {
                        children: Vec::new(),
                    },
                ),
            };
        }
        dir
    }

    /// Adds a directory (and any missing parents), returning its id.
    ///
    /// Existing directories are reused.
    pub fn add_dir(&mut self, path: &EntryPath) -> EntryId {
        self.ensure_dirs(path.components())
    }

    /// Appends a file at `path`, creating missing directories.
    ///
    /// Several files may share a name: lump-based formats depend on that.
    pub fn add_file(&mut self, path: &EntryPath, data: Vec<u8>) -> EntryId {
        let dir = match path.parent() {
            Some(parent) => self.ensure_dirs(parent.components()),
            None => self.root,
        };
        self.insert(dir, path.file_name(), NodeKind::File { data })
    }

    /// Removes a node and everything below it.
    ///
    /// Returns the removed ids in pre-order, starting with `id` itself.
    pub fn remove(&mut self, id: EntryId) -> Result<Vec<EntryId>> {
        if id == self.root {
            return Err(Error::EntryNotFound {
                path: "cannot remove the root directory".into(),
            });
        }
        let parent = self
            .parent_dir(id)
            .ok_or_else(|| Error::EntryNotFound {
                path: id.to_string(),
            })?;

        let mut removed = vec![id];
        removed.extend(self.walk(id));

        if let Some(NodeKind::Dir { children }) = self.get_mut(parent).map(|n| &mut n.kind) {
            children.retain(|&child| child != id);
        }
        for &gone in &removed {
            self.nodes[gone.0 as usize] = None;
        }
        Ok(removed)
    }

    /// Returns every node below `id` in pre-order (not including `id`).
    pub fn walk(&self, id: EntryId) -> Vec<EntryId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntryId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Returns every file in the tree in pre-order.
    pub fn files(&self) -> Vec<EntryId> {
        self.walk(self.root)
            .into_iter()
            .filter(|&id| !self.is_dir(id))
            .collect()
    }

    /// Returns the files directly inside the root directory.
    pub fn root_files(&self) -> Vec<EntryId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&id| !self.is_dir(id))
            .collect()
    }

    /// Finds the node at `path`, ignoring case.
    ///
    /// Files take precedence over directories of the same name for the last
    /// segment; the first matching file wins.
    pub fn entry_at_path(&self, path: &str) -> Option<EntryId> {
        let path = EntryPath::new(path).ok()?;
        let mut dir = self.root;
        if let Some(parent) = path.parent() {
            for segment in parent.components() {
                dir = self.child_named(dir, segment, true)?;
            }
        }
        self.child_named(dir, path.file_name(), false)
            .or_else(|| self.child_named(dir, path.file_name(), true))
    }

    /// Finds an entry by name.
    ///
    /// A name containing `/` is treated as a full path; otherwise the first
    /// file in the root directory with that name is returned.
    pub fn entry(&self, name: &str) -> Option<EntryId> {
        if name.contains('/') {
            return self.entry_at_path(name).filter(|&id| !self.is_dir(id));
        }
        self.child_named(self.root, name, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> EntryPath {
        EntryPath::new(s).unwrap()
    }

    #[test]
    fn test_new_tree_is_empty() {
        let tree = EntryTree::new();
        assert!(tree.is_empty());
        assert!(tree.is_dir(tree.root()));
        assert_eq!(tree.path_of(tree.root()).unwrap(), "");
    }

    #[test]
    fn test_add_file_creates_dirs() {
        let mut tree = EntryTree::new();
        let id = tree.add_file(&path("sprites/monsters/TROOA1"), b"img".to_vec());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.path_of(id).unwrap(), "sprites/monsters/TROOA1");
        assert_eq!(tree.data(id).unwrap(), b"img");
        assert_eq!(tree.namespace_of(id), Some("sprites"));
    }

    #[test]
    fn test_dirs_are_reused_case_insensitively() {
        let mut tree = EntryTree::new();
        let a = tree.add_file(&path("Sounds/a.ogg"), vec![]);
        let b = tree.add_file(&path("sounds/b.ogg"), vec![]);
        assert_eq!(tree.parent_dir(a), tree.parent_dir(b));
    }

    #[test]
    fn test_duplicate_file_names_allowed() {
        let mut tree = EntryTree::new();
        let first = tree.add_file(&path("THINGS"), vec![1]);
        let second = tree.add_file(&path("THINGS"), vec![2]);
        assert_ne!(first, second);
        assert_eq!(tree.entry("things"), Some(first));
    }

    #[test]
    fn test_entry_by_name_only_searches_root() {
        let mut tree = EntryTree::new();
        tree.add_file(&path("maps/MAP01"), vec![]);
        assert_eq!(tree.entry("MAP01"), None);
        assert!(tree.entry("maps/map01").is_some());
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = EntryTree::new();
        let keep = tree.add_file(&path("keep.txt"), vec![]);
        let inner = tree.add_file(&path("dir/sub/inner.txt"), vec![]);
        let dir = tree.entry_at_path("dir").unwrap();

        let removed = tree.remove(dir).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0], dir);
        assert!(removed.contains(&inner));
        assert!(!tree.contains(inner));
        assert!(tree.contains(keep));
        assert_eq!(tree.children(tree.root()), &[keep]);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut tree = EntryTree::new();
        let first = tree.add_file(&path("a"), vec![]);
        tree.remove(first).unwrap();
        let second = tree.add_file(&path("a"), vec![]);
        assert_ne!(first, second);
        assert!(tree.get(first).is_none());
    }

    #[test]
    fn test_remove_root_fails() {
        let mut tree = EntryTree::new();
        let root = tree.root();
        assert!(tree.remove(root).is_err());
    }

    #[test]
    fn test_ancestors_stop_before_root() {
        let mut tree = EntryTree::new();
        let id = tree.add_file(&path("a/b/c"), vec![]);
        let names: Vec<_> = tree
            .ancestors(id)
            .map(|d| tree.get(d).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a"]);

        let a = tree.entry_at_path("a").unwrap();
        assert!(tree.is_within(id, a));
        assert!(!tree.is_within(a, id));
    }

    #[test]
    fn test_files_preorder() {
        let mut tree = EntryTree::new();
        tree.add_file(&path("z"), vec![]);
        tree.add_file(&path("d/y"), vec![]);
        tree.add_file(&path("x"), vec![]);
        let names: Vec<_> = tree
            .files()
            .into_iter()
            .map(|id| tree.path_of(id).unwrap())
            .collect();
        assert_eq!(names, vec!["z", "d/y", "x"]);
        assert_eq!(tree.root_files().len(), 2);
    }

    #[test]
    fn test_set_data() {
        let mut tree = EntryTree::new();
        let id = tree.add_file(&path("a"), vec![1]);
        tree.set_data(id, vec![2, 3]).unwrap();
        assert_eq!(tree.get(id).unwrap().size(), 2);

        let dir = tree.add_dir(&path("d"));
        assert!(tree.set_data(dir, vec![]).is_err());
    }
}
