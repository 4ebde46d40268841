//! Ordered set of bookmarked entries.
//!
//! [`Bookmarks`] only stores references. Keeping the set consistent with the
//! archives (dropping bookmarks when their entry, directory or archive goes
//! away) and announcing changes is the [`Registry`](crate::Registry)'s job;
//! every bulk removal here reports how many bookmarks it dropped so the
//! caller can publish a single notification.

use crate::archive::{ArchiveId, EntryRef};
use crate::tree::{EntryId, EntryTree};

/// Bookmarked entries in insertion order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmarks {
    entries: Vec<EntryRef>,
}

impl Bookmarks {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bookmark. Returns `false` if it was already present.
    pub fn add(&mut self, entry: EntryRef) -> bool {
        if self.contains(entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Removes a bookmark. Returns `false` if it was not present.
    pub fn remove(&mut self, entry: EntryRef) -> bool {
        let before = self.entries.len();
        self.entries.retain(|&e| e != entry);
        self.entries.len() != before
    }

    /// Removes the bookmark at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<EntryRef> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Removes every bookmark inside `archive`.
    pub fn remove_all_in(&mut self, archive: ArchiveId) -> usize {
        self.remove_where(|e| e.archive == archive)
    }

    /// Removes the bookmark on directory `dir` and every bookmark below it.
    ///
    /// `tree` must be the tree of `archive` with `dir` still present.
    pub fn remove_all_in_dir(&mut self, archive: ArchiveId, tree: &EntryTree, dir: EntryId) -> usize {
        self.remove_where(|e| {
            e.archive == archive && (e.entry == dir || tree.ancestors(e.entry).any(|a| a == dir))
        })
    }

    /// Removes bookmarks on any of the given (already removed) entries.
    pub fn remove_entries(&mut self, archive: ArchiveId, removed: &[EntryId]) -> usize {
        self.remove_where(|e| e.archive == archive && removed.contains(&e.entry))
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&EntryRef) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(e));
        before - self.entries.len()
    }

    /// Returns the bookmark at `index`.
    pub fn get(&self, index: usize) -> Option<EntryRef> {
        self.entries.get(index).copied()
    }

    /// Returns `true` if `entry` is bookmarked.
    pub fn contains(&self, entry: EntryRef) -> bool {
        self.entries.contains(&entry)
    }

    /// Returns the bookmarks in insertion order.
    pub fn as_slice(&self) -> &[EntryRef] {
        &self.entries
    }

    /// Returns the number of bookmarks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no bookmarks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
