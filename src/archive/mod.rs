//! The archive contract shared by every container format.
//!
//! An [`Archive`] is an opened container: it owns an [`EntryTree`], knows its
//! format and where it was loaded from, and publishes [`ArchiveEvent`]s when
//! its contents change. Implementations embed an [`ArchiveCore`] holding the
//! shared bookkeeping and only supply [`Archive::load`] (and, for writable
//! formats, [`Archive::write`]); everything else has a default.
//!
//! Every archive instance receives a fresh [`ArchiveId`] when constructed,
//! whether or not a [`Registry`](crate::Registry) ever tracks it.

pub mod formats;

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bus::Bus;
use crate::format::FormatId;
use crate::search::SearchOptions;
use crate::tree::{EntryId, EntryTree};
use crate::{EntryPath, Error, Result};

static NEXT_ARCHIVE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of an archive instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveId(u64);

impl ArchiveId {
    /// Allocates a new, never before used id.
    pub fn next() -> Self {
        Self(NEXT_ARCHIVE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value of this id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to one entry of one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryRef {
    /// The archive holding the entry.
    pub archive: ArchiveId,
    /// The entry within that archive's tree.
    pub entry: EntryId,
}

impl EntryRef {
    /// Creates a reference.
    pub const fn new(archive: ArchiveId, entry: EntryId) -> Self {
        Self { archive, entry }
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.archive, self.entry)
    }
}

/// Change notifications published by an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEvent {
    /// The archive's contents changed.
    Modified,
    /// An entry's bytes were replaced.
    EntryModified(EntryId),
    /// Entries were removed; the list includes every removed descendant.
    EntriesRemoved(Vec<EntryId>),
    /// The archive was written to its destination.
    Saved,
}

/// Where an archive's bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// A file or directory on disk.
    Path(&'a Path),
    /// The bytes of an entry inside another archive.
    Entry {
        /// The entry the bytes were read from.
        parent: EntryRef,
        /// Name of that entry.
        name: &'a str,
        /// The entry's bytes.
        data: &'a [u8],
    },
}

impl<'a> Source<'a> {
    /// Returns the source's bytes, reading the file for path sources.
    pub fn bytes(&self) -> Result<Cow<'a, [u8]>> {
        match *self {
            Source::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
            Source::Entry { data, .. } => Ok(Cow::Borrowed(data)),
        }
    }

    /// Returns the final name of the source (file or entry name).
    pub fn name(&self) -> Cow<'a, str> {
        match *self {
            Source::Path(path) => path
                .file_name()
                .map(|n| Cow::Owned(n.to_string_lossy().into_owned()))
                .unwrap_or(Cow::Borrowed("")),
            Source::Entry { name, .. } => Cow::Borrowed(name),
        }
    }

    /// Describes the source for messages.
    pub fn describe(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Entry { parent, name, .. } => format!("{} (entry {})", name, parent),
        }
    }
}

/// Bookkeeping shared by every archive implementation.
#[derive(Debug)]
pub struct ArchiveCore {
    id: ArchiveId,
    format: FormatId,
    filename: String,
    path: Option<PathBuf>,
    parent_entry: Option<EntryRef>,
    tree: EntryTree,
    events: Bus<ArchiveEvent>,
    modified: bool,
}

impl ArchiveCore {
    /// Creates empty bookkeeping for a new archive of `format`.
    pub fn new(format: FormatId) -> Self {
        Self {
            id: ArchiveId::next(),
            format,
            filename: String::new(),
            path: None,
            parent_entry: None,
            tree: EntryTree::new(),
            events: Bus::new(),
            modified: false,
        }
    }

    /// Records where the archive is being loaded from.
    ///
    /// Path sources set the normalized path as the filename; entry sources
    /// use the entry name and record the back-reference.
    pub fn bind(&mut self, source: &Source<'_>) -> Result<()> {
        match *source {
            Source::Path(path) => {
                self.filename = crate::fs::normalize_path(path)?;
                self.path = Some(PathBuf::from(&self.filename));
                self.parent_entry = None;
            }
            Source::Entry { parent, name, .. } => {
                self.filename = name.to_string();
                self.path = None;
                self.parent_entry = Some(parent);
            }
        }
        Ok(())
    }

    /// Returns the archive id.
    pub fn id(&self) -> ArchiveId {
        self.id
    }

    /// Returns the format id.
    pub fn format(&self) -> FormatId {
        self.format
    }

    /// Returns the archive's filename or label.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Replaces the filename label.
    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    /// Returns the on-disk location, if the archive has one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records a new on-disk location (after saving elsewhere).
    pub fn set_path(&mut self, path: &Path) -> Result<()> {
        self.filename = crate::fs::normalize_path(path)?;
        self.path = Some(PathBuf::from(&self.filename));
        Ok(())
    }

    /// Returns the entry this archive was extracted from.
    pub fn parent_entry(&self) -> Option<EntryRef> {
        self.parent_entry
    }

    /// Returns the entry tree.
    pub fn tree(&self) -> &EntryTree {
        &self.tree
    }

    /// Returns the entry tree for modification.
    ///
    /// Changes made here are not published; use the [`Archive`] mutators for
    /// tracked changes.
    pub fn tree_mut(&mut self) -> &mut EntryTree {
        &mut self.tree
    }

    /// Returns the event bus.
    pub fn events(&self) -> &Bus<ArchiveEvent> {
        &self.events
    }

    /// Returns the event bus for subscribing.
    pub fn events_mut(&mut self) -> &mut Bus<ArchiveEvent> {
        &mut self.events
    }

    /// Returns `true` if the archive has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Sets the unsaved-changes flag, publishing [`ArchiveEvent::Modified`]
    /// when it is set.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
        if modified {
            self.events.publish(ArchiveEvent::Modified);
        }
    }

    /// Publishes an event on the archive's bus.
    pub fn publish(&mut self, event: ArchiveEvent) {
        self.events.publish(event);
    }
}

/// An opened container of entries.
pub trait Archive: fmt::Debug {
    /// Returns the shared bookkeeping.
    fn core(&self) -> &ArchiveCore;

    /// Returns the shared bookkeeping for modification.
    fn core_mut(&mut self) -> &mut ArchiveCore;

    /// Populates the archive from `source`.
    ///
    /// Implementations call [`ArchiveCore::bind`] and fill the tree. On error
    /// the archive must be discarded.
    fn load(&mut self, source: Source<'_>) -> Result<()>;

    /// Serializes the archive to bytes in its own format.
    fn write(&self) -> Result<Vec<u8>> {
        Err(Error::UnsupportedOperation {
            format: self.format_id().as_str(),
            operation: "write",
        })
    }

    /// Writes the archive to `path` and records it as the new location.
    fn save(&mut self, path: &Path) -> Result<()> {
        let bytes = self.write()?;
        std::fs::write(path, bytes)?;
        self.core_mut().set_path(path)?;
        self.mark_saved();
        Ok(())
    }

    /// Clears the unsaved flag and publishes [`ArchiveEvent::Saved`].
    fn mark_saved(&mut self) {
        let core = self.core_mut();
        core.modified = false;
        core.publish(ArchiveEvent::Saved);
    }

    /// Releases the archive's resources. Called once, when it is closed.
    fn close(&mut self) {
        let core = self.core_mut();
        core.events.clear();
        core.tree = EntryTree::new();
    }

    /// Returns the archive id.
    fn id(&self) -> ArchiveId {
        self.core().id()
    }

    /// Returns the format id.
    fn format_id(&self) -> FormatId {
        self.core().format()
    }

    /// Returns the archive's filename or label.
    fn filename(&self) -> &str {
        self.core().filename()
    }

    /// Returns the entry this archive was extracted from.
    fn parent_entry(&self) -> Option<EntryRef> {
        self.core().parent_entry()
    }

    /// Returns the entry tree.
    fn tree(&self) -> &EntryTree {
        self.core().tree()
    }

    /// Returns `true` if the archive has unsaved changes.
    fn is_modified(&self) -> bool {
        self.core().is_modified()
    }

    /// Finds an entry by name or path, ignoring case.
    fn entry(&self, name: &str) -> Option<EntryId> {
        self.tree().entry(name)
    }

    /// Returns the last entry matching `options`.
    fn find_last(&self, options: &SearchOptions) -> Option<EntryId> {
        options.find_last(self.tree())
    }

    /// Returns every entry matching `options`.
    fn find_all(&self, options: &SearchOptions) -> Vec<EntryId> {
        options.find_all(self.tree())
    }

    /// Returns the bus this archive publishes its changes on.
    fn events(&mut self) -> &mut Bus<ArchiveEvent> {
        self.core_mut().events_mut()
    }

    /// Adds a file entry at `path`.
    fn add_entry(&mut self, path: &str, data: Vec<u8>) -> Result<EntryId> {
        let path = EntryPath::new(path)?;
        let core = self.core_mut();
        let id = core.tree.add_file(&path, data);
        core.set_modified(true);
        Ok(id)
    }

    /// Replaces the bytes of an entry.
    fn import_entry_data(&mut self, entry: EntryId, data: Vec<u8>) -> Result<()> {
        let core = self.core_mut();
        core.tree.set_data(entry, data)?;
        core.publish(ArchiveEvent::EntryModified(entry));
        core.set_modified(true);
        Ok(())
    }

    /// Removes an entry (and, for directories, everything below it).
    fn remove_entry(&mut self, entry: EntryId) -> Result<Vec<EntryId>> {
        let core = self.core_mut();
        let removed = core.tree.remove(entry)?;
        core.publish(ArchiveEvent::EntriesRemoved(removed.clone()));
        core.set_modified(true);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::formats::WadArchive;
    use super::*;

    #[test]
    fn test_archive_ids_are_unique() {
        let a = ArchiveId::next();
        let b = ArchiveId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_entry_ref_display() {
        let id = ArchiveId::next();
        let r = EntryRef::new(id, EntryId::from_raw(3));
        assert_eq!(r.to_string(), format!("#{}:#3", id.raw()));
    }

    #[test]
    fn test_mutators_publish_events() {
        let mut wad = WadArchive::new();
        let (_, inbox) = wad.events().subscribe_inbox();

        let id = wad.add_entry("MAP01", vec![1]).unwrap();
        wad.import_entry_data(id, vec![2]).unwrap();
        wad.remove_entry(id).unwrap();

        assert_eq!(
            inbox.drain(),
            vec![
                ArchiveEvent::Modified,
                ArchiveEvent::EntryModified(id),
                ArchiveEvent::Modified,
                ArchiveEvent::EntriesRemoved(vec![id]),
                ArchiveEvent::Modified,
            ]
        );
        assert!(wad.is_modified());
    }

    #[test]
    fn test_bind_entry_source() {
        let parent = EntryRef::new(ArchiveId::next(), EntryId::from_raw(1));
        let mut core = ArchiveCore::new(FormatId::Wad);
        core.bind(&Source::Entry {
            parent,
            name: "inner.wad",
            data: &[],
        })
        .unwrap();
        assert_eq!(core.filename(), "inner.wad");
        assert_eq!(core.parent_entry(), Some(parent));
        assert!(core.path().is_none());
    }

    #[test]
    fn test_write_unsupported_by_default() {
        let pak = formats::PakArchive::new();
        let err = pak.write().unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }
}
