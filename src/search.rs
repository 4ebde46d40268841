//! Structured entry search queries.
//!
//! A [`SearchOptions`] value describes which files of an [`EntryTree`] match:
//! a wildcard name (`*` and `?`, case-insensitive), an optional namespace
//! (the top-level directory a file lives under), an optional directory to
//! restrict the search to and whether to descend into its subdirectories.
//!
//! # Example
//!
//! ```rust
//! use arcmgr::{EntryPath, EntryTree, SearchOptions};
//!
//! let mut tree = EntryTree::new();
//! tree.add_file(&EntryPath::new("sprites/TROOA1.png").unwrap(), vec![]);
//! tree.add_file(&EntryPath::new("sprites/TROOB1.png").unwrap(), vec![]);
//!
//! let query = SearchOptions::new()
//!     .name("troo?1")
//!     .namespace("sprites")
//!     .ignore_ext(true);
//! assert_eq!(query.find_all(&tree).len(), 2);
//! ```

use glob::{MatchOptions, Pattern};

use crate::tree::{EntryId, EntryTree};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Criteria for locating entries within an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Entry name, possibly with `*`/`?` wildcards.
    pub name: Option<String>,
    /// Top-level directory the entry must live under.
    pub namespace: Option<String>,
    /// Directory to search in (the root when unset).
    pub dir: Option<String>,
    /// Whether entries in subdirectories of `dir` are searched.
    pub search_subdirs: bool,
    /// Whether the name is matched against the entry name without extension.
    pub ignore_ext: bool,
}

impl SearchOptions {
    /// Creates a query that matches every file in the root directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name to match.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the namespace to match.
    ///
    /// Setting a namespace also enables subdirectory search, since namespace
    /// members are usually nested.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self.search_subdirs = true;
        self
    }

    /// Restricts the search to a directory.
    pub fn dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Sets whether subdirectories are searched.
    pub fn search_subdirs(mut self, enabled: bool) -> Self {
        self.search_subdirs = enabled;
        self
    }

    /// Sets whether extensions are ignored when matching names.
    pub fn ignore_ext(mut self, enabled: bool) -> Self {
        self.ignore_ext = enabled;
        self
    }

    /// Returns the last matching file in pre-order, if any.
    pub fn find_last(&self, tree: &EntryTree) -> Option<EntryId> {
        let matcher = Matcher::new(self);
        self.candidates(tree)
            .into_iter()
            .rev()
            .find(|&id| matcher.matches(self, tree, id))
    }

    /// Returns every matching file in pre-order.
    pub fn find_all(&self, tree: &EntryTree) -> Vec<EntryId> {
        let matcher = Matcher::new(self);
        self.candidates(tree)
            .into_iter()
            .filter(|&id| matcher.matches(self, tree, id))
            .collect()
    }

    fn candidates(&self, tree: &EntryTree) -> Vec<EntryId> {
        let dir = match &self.dir {
            Some(dir) => match tree.entry_at_path(dir) {
                Some(id) if tree.is_dir(id) => id,
                _ => return Vec::new(),
            },
            None => tree.root(),
        };
        let nodes = if self.search_subdirs {
            tree.walk(dir)
        } else {
            tree.children(dir).to_vec()
        };
        nodes.into_iter().filter(|&id| !tree.is_dir(id)).collect()
    }
}

enum Matcher {
    Any,
    Glob(Pattern),
    Literal(String),
}

impl Matcher {
    fn new(options: &SearchOptions) -> Self {
        match &options.name {
            None => Matcher::Any,
            Some(name) => match Pattern::new(name) {
                Ok(pattern) => Matcher::Glob(pattern),
                Err(_) => Matcher::Literal(name.clone()),
            },
        }
    }

    fn matches(&self, options: &SearchOptions, tree: &EntryTree, id: EntryId) -> bool {
        if let Some(namespace) = &options.namespace {
            match tree.namespace_of(id) {
                Some(ns) if ns.eq_ignore_ascii_case(namespace) => {}
                _ => return false,
            }
        }

        let Some(node) = tree.get(id) else {
            return false;
        };
        let mut name = node.name();
        if options.ignore_ext {
            if let Some(pos) = name.rfind('.').filter(|&pos| pos > 0) {
                name = &name[..pos];
            }
        }

        match self {
            Matcher::Any => true,
            Matcher::Glob(pattern) => pattern.matches_with(name, MATCH_OPTIONS),
            Matcher::Literal(literal) => literal.eq_ignore_ascii_case(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryPath;

    fn tree(paths: &[&str]) -> EntryTree {
        let mut tree = EntryTree::new();
        for p in paths {
            tree.add_file(&EntryPath::new(p).unwrap(), vec![]);
        }
        tree
    }

    fn names(tree: &EntryTree, ids: &[EntryId]) -> Vec<String> {
        ids.iter().map(|&id| tree.path_of(id).unwrap()).collect()
    }

    #[test]
    fn test_default_matches_root_files_only() {
        let tree = tree(&["a", "dir/b", "c"]);
        let found = SearchOptions::new().find_all(&tree);
        assert_eq!(names(&tree, &found), vec!["a", "c"]);
    }

    #[test]
    fn test_wildcard_case_insensitive() {
        let tree = tree(&["MAP01", "MAP02", "E1M1"]);
        let query = SearchOptions::new().name("map*");
        assert_eq!(query.find_all(&tree).len(), 2);
        assert_eq!(
            names(&tree, &[query.find_last(&tree).unwrap()]),
            vec!["MAP02"]
        );
    }

    #[test]
    fn test_find_last_prefers_later_duplicate() {
        let mut tree = EntryTree::new();
        let path = EntryPath::new("PLAYPAL").unwrap();
        tree.add_file(&path, vec![1]);
        let second = tree.add_file(&path, vec![2]);
        let query = SearchOptions::new().name("PLAYPAL");
        assert_eq!(query.find_last(&tree), Some(second));
    }

    #[test]
    fn test_namespace_filter() {
        let tree = tree(&["sprites/A", "flats/A", "A"]);
        let query = SearchOptions::new().name("a").namespace("SPRITES");
        assert_eq!(names(&tree, &query.find_all(&tree)), vec!["sprites/A"]);
    }

    #[test]
    fn test_dir_with_and_without_subdirs() {
        let tree = tree(&["gfx/a.png", "gfx/hud/b.png", "c.png"]);
        let flat = SearchOptions::new().dir("gfx");
        assert_eq!(names(&tree, &flat.find_all(&tree)), vec!["gfx/a.png"]);

        let deep = SearchOptions::new().dir("gfx").search_subdirs(true);
        assert_eq!(deep.find_all(&tree).len(), 2);

        let missing = SearchOptions::new().dir("nope").search_subdirs(true);
        assert!(missing.find_all(&tree).is_empty());
    }

    #[test]
    fn test_ignore_ext() {
        let tree = tree(&["TITLEPIC.png"]);
        assert!(SearchOptions::new().name("titlepic").find_last(&tree).is_none());
        assert!(
            SearchOptions::new()
                .name("titlepic")
                .ignore_ext(true)
                .find_last(&tree)
                .is_some()
        );
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_literal() {
        let tree = tree(&["[bad"]);
        let query = SearchOptions::new().name("[BAD");
        assert!(query.find_last(&tree).is_some());
    }
}
