//! The archive registry.
//!
//! [`Registry`] owns every open archive, in registration order, along with
//! the resource flag and child list of each, the base resource selection,
//! the bookmark set and the recent file list. All state changes go through
//! `&mut self` and are announced on the registry's [`Bus<Event>`] after they
//! are committed.
//!
//! The operations are split by concern:
//!
//! - `open`: opening archives from paths and entries, creating new ones
//! - `close`: cascading close and dependency queries
//! - `resolve`: resource lookup across open archives and the base archive
//! - `base`: base resource selection
//! - `lists`: bookmarks and recent files
//!
//! # Example
//!
//! ```rust,no_run
//! use arcmgr::{Registry, RegistryConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let mut registry = Registry::new(RegistryConfig::default());
//!     registry.subscribe(|event| println!("{}", event));
//!
//!     let pk3 = registry.open_path("mod.pk3", false)?;
//!     if let Some(found) = registry.find_first("MAPINFO", None) {
//!         println!("MAPINFO found in archive {}", found.archive);
//!     }
//!     registry.close(pk3);
//!     Ok(())
//! }
//! ```

mod base;
mod close;
mod lists;
mod open;
mod resolve;

pub use resolve::Lookup;

use std::path::Path;

use log::debug;

use crate::archive::{Archive, ArchiveEvent, ArchiveId, EntryRef};
use crate::base::BaseResources;
use crate::bookmarks::Bookmarks;
use crate::bus::{Bus, Inbox, SubscriberId};
use crate::config::RegistryConfig;
use crate::event::Event;
use crate::pool::{NoPool, ResourcePool};
use crate::recent::RecentFiles;
use crate::tree::EntryId;
use crate::{Error, Result};

/// One tracked archive.
#[derive(Debug)]
struct OpenArchive {
    archive: Box<dyn Archive>,
    resource: bool,
    children: Vec<ArchiveId>,
    inbox: Inbox<ArchiveEvent>,
    subscription: SubscriberId,
}

/// Registry of open archives.
pub struct Registry {
    config: RegistryConfig,
    records: Vec<OpenArchive>,
    events: Bus<Event>,
    pool: Box<dyn ResourcePool>,
    base: BaseResources,
    bookmarks: Bookmarks,
    recent: RecentFiles,
    warnings: Vec<Error>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("records", &self.records)
            .field("base", &self.base)
            .field("bookmarks", &self.bookmarks)
            .field("recent", &self.recent)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Creates an empty registry that notifies no resource pool.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_pool(config, NoPool)
    }

    /// Creates an empty registry that reports archive eligibility to `pool`.
    ///
    /// The base resource is not loaded until
    /// [`init_base_resource`](Self::init_base_resource) is called.
    pub fn with_pool(config: RegistryConfig, pool: impl ResourcePool + 'static) -> Self {
        let mut recent = RecentFiles::new(config.max_recent_files);
        for path in config.recent_files.iter().rev() {
            recent.touch(crate::fs::forward_slashes(path));
        }
        Self {
            base: BaseResources::new(config.base_resource_paths.clone()),
            config,
            records: Vec::new(),
            events: Bus::new(),
            pool: Box::new(pool),
            bookmarks: Bookmarks::new(),
            recent,
            warnings: Vec::new(),
        }
    }

    /// Returns the configuration the registry was created with, updated by
    /// any explicit setting changes since.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Enables or disables mounting of embedded archives on open.
    pub fn set_auto_mount_embedded(&mut self, enabled: bool) {
        self.config.auto_mount_embedded = enabled;
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Returns the registry's notification bus.
    pub fn events(&self) -> &Bus<Event> {
        &self.events
    }

    /// Returns the registry's notification bus for subscribing.
    pub fn events_mut(&mut self) -> &mut Bus<Event> {
        &mut self.events
    }

    /// Subscribes a callback to every registry notification.
    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriberId {
        self.events.subscribe(callback)
    }

    /// Takes the soft conditions recorded since the last call.
    ///
    /// These are [`Error::OrphanedNesting`] records and failures to mount
    /// embedded archives; none of them caused the surrounding open to fail.
    pub fn take_warnings(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, warning: Error) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Returns the number of open archives.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no archive is open.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the ids of every open archive, in registration order.
    pub fn ids(&self) -> Vec<ArchiveId> {
        self.records.iter().map(|r| r.archive.id()).collect()
    }

    /// Returns `true` if `id` is tracked.
    pub fn contains(&self, id: ArchiveId) -> bool {
        self.index_of(id).is_some()
    }

    /// Returns the registry index of `id`.
    pub fn index_of(&self, id: ArchiveId) -> Option<usize> {
        self.records.iter().position(|r| r.archive.id() == id)
    }

    /// Returns a tracked archive.
    pub fn archive(&self, id: ArchiveId) -> Option<&dyn Archive> {
        self.record(id).map(|r| &*r.archive)
    }

    /// Returns the archive at registry index `index`.
    pub fn archive_at(&self, index: usize) -> Option<&dyn Archive> {
        self.records.get(index).map(|r| &*r.archive)
    }

    /// Returns the id of the archive at registry index `index`.
    pub fn id_at(&self, index: usize) -> Result<ArchiveId> {
        self.records
            .get(index)
            .map(|r| r.archive.id())
            .ok_or(Error::InvalidIndex {
                index,
                len: self.records.len(),
            })
    }

    /// Finds a tracked archive opened from `path` on disk.
    pub fn archive_by_path(&self, path: impl AsRef<Path>) -> Option<ArchiveId> {
        let normalized = crate::fs::normalize_path(path.as_ref()).ok()?;
        self.find_by_normalized_path(&normalized)
    }

    fn find_by_normalized_path(&self, normalized: &str) -> Option<ArchiveId> {
        self.records
            .iter()
            .find(|r| r.archive.parent_entry().is_none() && r.archive.filename() == normalized)
            .map(|r| r.archive.id())
    }

    /// Returns the archives opened from entries of `id`.
    pub fn children_of(&self, id: ArchiveId) -> Option<&[ArchiveId]> {
        self.record(id).map(|r| r.children.as_slice())
    }

    /// Returns the tracked archive `id` was opened from, if any.
    pub fn parent_of(&self, id: ArchiveId) -> Option<ArchiveId> {
        let parent = self.archive(id)?.parent_entry()?.archive;
        self.contains(parent).then_some(parent)
    }

    fn record(&self, id: ArchiveId) -> Option<&OpenArchive> {
        self.records.iter().find(|r| r.archive.id() == id)
    }

    fn record_mut(&mut self, id: ArchiveId) -> Option<&mut OpenArchive> {
        self.records.iter_mut().find(|r| r.archive.id() == id)
    }

    // ========================================================================
    // Resource flag
    // ========================================================================

    /// Returns whether `id` takes part in resource resolution.
    pub fn is_resource(&self, id: ArchiveId) -> Option<bool> {
        self.record(id).map(|r| r.resource)
    }

    /// Sets whether `id` takes part in resource resolution.
    ///
    /// The resource pool is only notified when the flag actually changes.
    pub fn set_resource(&mut self, id: ArchiveId, resource: bool) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.archive.id() == id)
            .ok_or(Error::InvalidHandle(id))?;
        if record.resource == resource {
            return Ok(());
        }
        record.resource = resource;
        if resource {
            self.pool.add_archive(id, &*record.archive);
        } else {
            self.pool.remove_archive(id);
        }
        Ok(())
    }

    // ========================================================================
    // Mediated mutation
    // ========================================================================

    /// Runs `f` on a tracked archive, then handles the notifications the
    /// archive published while `f` ran.
    ///
    /// Content changes are re-broadcast as [`Event::ArchiveModified`] and
    /// [`Event::ArchiveSaved`] with the archive's index; removed entries
    /// drop their bookmarks.
    pub fn with_archive_mut<R>(
        &mut self,
        id: ArchiveId,
        f: impl FnOnce(&mut dyn Archive) -> R,
    ) -> Result<R> {
        let record = self.record_mut(id).ok_or(Error::InvalidHandle(id))?;
        let out = f(&mut *record.archive);
        self.process_archive_events(id);
        Ok(out)
    }

    fn process_archive_events(&mut self, id: ArchiveId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let mut pruned = 0;
        for event in self.records[index].inbox.drain() {
            let index = self.index_of(id).unwrap_or(index);
            match event {
                ArchiveEvent::Modified => self.events.publish(Event::ArchiveModified { index }),
                ArchiveEvent::Saved => self.events.publish(Event::ArchiveSaved { index }),
                ArchiveEvent::EntriesRemoved(removed) => {
                    pruned += self.bookmarks.remove_entries(id, &removed);
                    self.close_opened_from(id, &removed);
                }
                ArchiveEvent::EntryModified(_) => {}
            }
        }
        if pruned > 0 {
            self.events.publish(Event::BookmarksChanged);
        }
    }

    /// Closes every registered archive opened from one of the `entries` of
    /// `archive`.
    fn close_opened_from(&mut self, archive: ArchiveId, entries: &[EntryId]) {
        let orphans: Vec<ArchiveId> = self
            .records
            .iter()
            .filter(|r| {
                r.archive
                    .parent_entry()
                    .is_some_and(|p| p.archive == archive && entries.contains(&p.entry))
            })
            .map(|r| r.archive.id())
            .collect();
        for child in orphans {
            debug!("closing {} along with the entry it was opened from", child);
            self.close(child);
        }
    }

    /// Adds a file to a tracked archive.
    pub fn add_entry(&mut self, id: ArchiveId, path: &str, data: Vec<u8>) -> Result<EntryRef> {
        let entry = self.with_archive_mut(id, |archive| archive.add_entry(path, data))??;
        Ok(EntryRef::new(id, entry))
    }

    /// Replaces the bytes of an entry of a tracked archive.
    pub fn import_entry_data(&mut self, entry: EntryRef, data: Vec<u8>) -> Result<()> {
        self.with_archive_mut(entry.archive, |archive| {
            archive.import_entry_data(entry.entry, data)
        })?
    }

    /// Removes an entry (or a directory and its contents) from a tracked
    /// archive, dropping the bookmarks on everything removed.
    ///
    /// Archives opened from any removed entry are closed first.
    pub fn remove_entry(&mut self, entry: EntryRef) -> Result<()> {
        let record = self
            .records
            .iter()
            .find(|r| r.archive.id() == entry.archive)
            .ok_or(Error::InvalidHandle(entry.archive))?;
        let tree = record.archive.tree();
        if !tree.contains(entry.entry) || tree.parent_dir(entry.entry).is_none() {
            return Err(Error::EntryNotFound {
                path: entry.to_string(),
            });
        }
        let mut doomed = tree.walk(entry.entry);
        doomed.push(entry.entry);
        self.close_opened_from(entry.archive, &doomed);

        let record = self
            .records
            .iter()
            .find(|r| r.archive.id() == entry.archive)
            .ok_or(Error::InvalidHandle(entry.archive))?;
        let tree = record.archive.tree();
        let pruned = if tree.is_dir(entry.entry) {
            self.bookmarks
                .remove_all_in_dir(entry.archive, tree, entry.entry)
        } else {
            usize::from(self.bookmarks.remove(entry))
        };
        if pruned > 0 {
            self.events.publish(Event::BookmarksChanged);
        }

        self.with_archive_mut(entry.archive, |archive| archive.remove_entry(entry.entry))??;
        Ok(())
    }

    /// Saves a tracked archive.
    ///
    /// With a `path`, the archive is written there and becomes its new
    /// location. Without one, an archive opened from an entry is written back
    /// into that entry of its parent, and an archive opened from disk is
    /// written over its file.
    pub fn save_archive(&mut self, id: ArchiveId, path: Option<&Path>) -> Result<()> {
        let archive = self.archive(id).ok_or(Error::InvalidHandle(id))?;
        let format = archive.format_id().as_str();

        if let Some(path) = path {
            self.with_archive_mut(id, |archive| archive.save(path))??;
            self.add_recent_file(path);
            return Ok(());
        }

        if let Some(parent) = archive.parent_entry() {
            if !self.contains(parent.archive) {
                return Err(Error::InvalidHandle(parent.archive));
            }
            let bytes = archive.write()?;
            self.import_entry_data(parent, bytes)?;
            self.with_archive_mut(id, |archive| archive.mark_saved())?;
            return Ok(());
        }

        match archive.core().path().map(Path::to_path_buf) {
            Some(own) => self.with_archive_mut(id, |archive| archive.save(&own))?,
            None => Err(Error::UnsupportedOperation {
                format,
                operation: "save without a destination",
            }),
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.close_all();
        self.unload_base_resource();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatId;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = Registry::new(RegistryConfig::default());
        assert!(registry.is_empty());
        assert!(registry.ids().is_empty());
        assert!(registry.archive_at(0).is_none());
        assert!(matches!(
            registry.id_at(0),
            Err(Error::InvalidIndex { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_restored_recent_files_keep_order() {
        let config = RegistryConfig::new().recent_files(["b.wad", "a.wad"]);
        let registry = Registry::new(config);
        assert_eq!(registry.recent_files(), &["b.wad", "a.wad"]);
    }

    #[test]
    fn test_mutation_rebroadcasts_with_index() {
        let mut registry = Registry::new(RegistryConfig::default());
        let first = registry.new_archive(FormatId::Wad).unwrap();
        let second = registry.new_archive(FormatId::Zip).unwrap();
        let (_, inbox) = registry.events_mut().subscribe_inbox();

        registry.add_entry(second, "a.txt", vec![]).unwrap();
        assert_eq!(inbox.drain(), vec![Event::ArchiveModified { index: 1 }]);

        registry.add_entry(first, "MAP01", vec![]).unwrap();
        assert_eq!(inbox.drain(), vec![Event::ArchiveModified { index: 0 }]);
    }

    #[test]
    fn test_set_resource_requires_tracked_handle() {
        let mut registry = Registry::new(RegistryConfig::default());
        let stray = crate::archive::formats::WadArchive::new();
        assert!(matches!(
            registry.set_resource(stray.id(), false),
            Err(Error::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_unsaved_archive_needs_destination() {
        let mut registry = Registry::new(RegistryConfig::default());
        let id = registry.new_archive(FormatId::Wad).unwrap();
        let err = registry.save_archive(id, None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }
}
