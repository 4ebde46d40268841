//! Closing archives.
//!
//! Closing cascades through the nesting forest: every archive opened from an
//! entry of the closed archive is closed first, depth first, so that no
//! registered archive ever outlives the archive its bytes came from.

use std::path::Path;

use log::info;

use super::Registry;
use crate::archive::ArchiveId;
use crate::event::Event;

impl Registry {
    /// Closes a registered archive and, recursively, every archive opened
    /// from its entries.
    ///
    /// Publishes [`Event::ArchiveClosing`] before anything is torn down and
    /// [`Event::ArchiveClosed`] afterwards, both carrying the index the
    /// archive had at that moment. Bookmarks in the archive and in every
    /// archive closed along with it are dropped together, with a single
    /// [`Event::BookmarksChanged`]. Returns `false` if `id` is not registered.
    pub fn close(&mut self, id: ArchiveId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.events.publish(Event::ArchiveClosing { index });

        let subtree = self.dependents_of(id).unwrap_or_default();
        let pruned = std::iter::once(id)
            .chain(subtree)
            .map(|archive| self.bookmarks.remove_all_in(archive))
            .sum::<usize>();
        if pruned > 0 {
            self.events.publish(Event::BookmarksChanged);
        }
        if self.records[index].resource {
            self.pool.remove_archive(id);
        }

        let children = std::mem::take(&mut self.records[index].children);
        for child in children {
            self.close(child);
        }

        let Some(index) = self.index_of(id) else {
            return true;
        };
        if let Some(parent) = self.records[index].archive.parent_entry() {
            if let Some(record) = self.record_mut(parent.archive) {
                record.children.retain(|&child| child != id);
            }
        }

        let mut record = self.records.remove(index);
        record.archive.events().unsubscribe(record.subscription);
        record.archive.close();
        info!("closed {} ({})", record.archive.filename(), id);

        self.events.publish(Event::ArchiveClosed { index });
        true
    }

    /// Closes the archive opened from `path` on disk.
    pub fn close_path(&mut self, path: impl AsRef<Path>) -> bool {
        match self.archive_by_path(path) {
            Some(id) => self.close(id),
            None => false,
        }
    }

    /// Closes the archive at registry index `index`.
    pub fn close_at(&mut self, index: usize) -> bool {
        match self.id_at(index) {
            Ok(id) => self.close(id),
            Err(_) => false,
        }
    }

    /// Closes every registered archive.
    pub fn close_all(&mut self) {
        while let Some(id) = self.records.first().map(|r| r.archive.id()) {
            self.close(id);
        }
    }

    /// Returns every archive transitively opened from entries of `id`, in
    /// depth-first pre-order, or `None` if `id` is not registered.
    pub fn dependents_of(&self, id: ArchiveId) -> Option<Vec<ArchiveId>> {
        let mut stack: Vec<ArchiveId> = self.children_of(id)?.iter().rev().copied().collect();
        let mut out = Vec::new();
        while let Some(next) = stack.pop() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            if let Some(children) = self.children_of(next) {
                stack.extend(children.iter().rev());
            }
        }
        Some(out)
    }
}
