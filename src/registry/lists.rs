//! Bookmarks and recent files.

use std::path::Path;

use super::Registry;
use crate::archive::EntryRef;
use crate::event::Event;

impl Registry {
    // ========================================================================
    // Bookmarks
    // ========================================================================

    /// Bookmarks an entry of a registered archive.
    ///
    /// Returns `false` if the archive is not registered, the entry does not
    /// exist or it is already bookmarked.
    pub fn add_bookmark(&mut self, entry: EntryRef) -> bool {
        let exists = self
            .archive(entry.archive)
            .is_some_and(|archive| archive.tree().contains(entry.entry));
        if !exists || !self.bookmarks.add(entry) {
            return false;
        }
        self.events.publish(Event::BookmarksChanged);
        true
    }

    /// Removes a bookmark.
    pub fn remove_bookmark(&mut self, entry: EntryRef) -> bool {
        if !self.bookmarks.remove(entry) {
            return false;
        }
        self.events.publish(Event::BookmarksChanged);
        true
    }

    /// Removes the bookmark at `index`.
    pub fn remove_bookmark_at(&mut self, index: usize) -> Option<EntryRef> {
        let removed = self.bookmarks.remove_at(index)?;
        self.events.publish(Event::BookmarksChanged);
        Some(removed)
    }

    /// Returns the bookmarks in insertion order.
    pub fn bookmarks(&self) -> &[EntryRef] {
        self.bookmarks.as_slice()
    }

    /// Returns the bookmark at `index`.
    pub fn bookmark(&self, index: usize) -> Option<EntryRef> {
        self.bookmarks.get(index)
    }

    /// Returns `true` if `entry` is bookmarked.
    pub fn is_bookmarked(&self, entry: EntryRef) -> bool {
        self.bookmarks.contains(entry)
    }

    // ========================================================================
    // Recent files
    // ========================================================================

    /// Moves `path` to the front of the recent file list.
    ///
    /// Paths that do not exist on disk are ignored. Returns `true` if the
    /// path is listed afterwards.
    pub fn add_recent_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if !path.exists() {
            return false;
        }
        let Ok(normalized) = crate::fs::normalize_path(path) else {
            return false;
        };
        if self.recent.touch(normalized) {
            self.events.publish(Event::RecentFilesChanged);
        }
        true
    }

    /// Removes `path` from the recent file list.
    pub fn remove_recent_file(&mut self, path: &str) -> bool {
        let path = crate::fs::forward_slashes(path);
        if !self.recent.remove(&path) {
            return false;
        }
        self.events.publish(Event::RecentFilesChanged);
        true
    }

    /// Replaces the recent file list.
    ///
    /// Each path is added in turn, so the last one ends up most recent.
    /// A single [`Event::RecentFilesChanged`] is published if the list
    /// differs from before.
    pub fn set_recent_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let before = self.recent.as_slice().to_vec();
        let muted = self.events.is_muted();
        self.events.set_muted(true);
        self.recent.clear();
        for path in paths {
            self.add_recent_file(path);
        }
        self.events.set_muted(muted);
        if self.recent.as_slice() != before.as_slice() {
            self.events.publish(Event::RecentFilesChanged);
        }
    }

    /// Returns the recent files, most recent first.
    pub fn recent_files(&self) -> &[String] {
        self.recent.as_slice()
    }

    /// Returns the recent file at `index` (0 is the most recent).
    pub fn recent_file(&self, index: usize) -> Option<&str> {
        self.recent.get(index)
    }

    /// Changes the recent file list bound, trimming the list if needed.
    pub fn set_max_recent_files(&mut self, max: usize) {
        self.config.max_recent_files = max;
        if self.recent.set_max(max) {
            self.events.publish(Event::RecentFilesChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::archive::EntryRef;
    use crate::format::FormatId;
    use crate::tree::EntryId;
    use crate::{Event, Registry, RegistryConfig};

    #[test]
    fn test_bookmark_requires_existing_entry() {
        let mut registry = Registry::new(RegistryConfig::default());
        let id = registry.new_archive(FormatId::Wad).unwrap();
        assert!(!registry.add_bookmark(EntryRef::new(id, EntryId::from_raw(40))));

        let entry = registry.add_entry(id, "THINGS", vec![1]).unwrap();
        assert!(registry.add_bookmark(entry));
        assert!(!registry.add_bookmark(entry));
        assert_eq!(registry.bookmarks(), &[entry]);
    }

    #[test]
    fn test_remove_bookmark_at_notifies_once() {
        let mut registry = Registry::new(RegistryConfig::default());
        let id = registry.new_archive(FormatId::Wad).unwrap();
        let entry = registry.add_entry(id, "LINEDEFS", vec![]).unwrap();
        registry.add_bookmark(entry);
        let (_, inbox) = registry.events_mut().subscribe_inbox();

        assert_eq!(registry.remove_bookmark_at(0), Some(entry));
        assert_eq!(registry.remove_bookmark_at(0), None);
        assert_eq!(inbox.drain(), vec![Event::BookmarksChanged]);
    }

    #[test]
    fn test_missing_recent_file_is_ignored() {
        let mut registry = Registry::new(RegistryConfig::default());
        assert!(!registry.add_recent_file("/no/such/file.wad"));
        assert!(registry.recent_files().is_empty());
    }

    #[test]
    fn test_set_max_recent_files_trims() {
        let config = RegistryConfig::new().recent_files(["a", "b", "c"]);
        let mut registry = Registry::new(config);
        let (_, inbox) = registry.events_mut().subscribe_inbox();
        registry.set_max_recent_files(2);
        assert_eq!(registry.recent_files(), &["a", "b"]);
        assert_eq!(inbox.drain(), vec![Event::RecentFilesChanged]);
    }
}
