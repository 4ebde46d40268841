//! Opening archives from disk and from entries, and creating new ones.

use std::path::Path;

use log::{debug, error, info};

use super::{OpenArchive, Registry};
use crate::archive::{Archive, ArchiveId, EntryRef, Source};
use crate::event::Event;
use crate::format::{self, FormatId};
use crate::tree::EntryId;
use crate::{Error, Result};

impl Registry {
    /// Opens the archive at `path` and registers it.
    ///
    /// A directory opens as a [`FormatId::Folder`] archive. If an archive
    /// opened from the same (normalized) path is already registered, its id
    /// is returned without touching the disk, even if the file has since
    /// been deleted. Unless `silent`, an [`Event::ArchiveOpened`] is
    /// published in both cases.
    ///
    /// On success the path is recorded as a recent file.
    pub fn open_path(&mut self, path: impl AsRef<Path>, silent: bool) -> Result<ArchiveId> {
        let path = path.as_ref();
        let normalized = crate::fs::normalize_path(path)?;

        if let Some(id) = self.find_by_normalized_path(&normalized) {
            debug!("{} is already open as {}", normalized, id);
            self.announce_opened(id, silent);
            return Ok(id);
        }

        let is_dir = std::fs::metadata(path)?.is_dir();
        let archive = Self::load_path(path, is_dir)?;
        let id = self.track(archive, None, silent);
        self.add_recent_file(path);
        Ok(id)
    }

    /// Loads the archive at `path` without registering it.
    ///
    /// The caller owns the result; it takes part in no registry bookkeeping.
    pub fn open_path_unmanaged(&self, path: impl AsRef<Path>) -> Result<Box<dyn Archive>> {
        let path = path.as_ref();
        let is_dir = std::fs::metadata(path)?.is_dir();
        Self::load_path(path, is_dir)
    }

    /// Opens the archive stored in an entry and registers it as a child of
    /// the entry's archive.
    ///
    /// The entry may belong to a registered archive or to the loaded base
    /// archive. If an archive opened from the same entry is already
    /// registered, its id is returned. Opening from an archive that is not
    /// registered succeeds but leaves the new archive without a parent in the
    /// nesting forest; an [`Error::OrphanedNesting`] warning is recorded.
    ///
    /// Entry-backed archives are never recorded as recent files.
    pub fn open_entry(&mut self, entry: EntryRef, silent: bool) -> Result<ArchiveId> {
        if let Some(id) = self.find_by_parent_entry(entry) {
            debug!("entry {} is already open as {}", entry, id);
            self.announce_opened(id, silent);
            return Ok(id);
        }
        let parent = self
            .lookup_archive(entry.archive)
            .ok_or(Error::InvalidHandle(entry.archive))?;
        let archive = Self::load_entry(parent, entry.entry)?;
        Ok(self.adopt(entry, archive, silent))
    }

    /// Opens the archive stored in an entry of an archive the caller owns.
    ///
    /// This is how archives returned by the `*_unmanaged` operations can
    /// still have their contents registered. Unless `parent` happens to be
    /// registered, the result is recorded as an orphan.
    pub fn open_entry_in(
        &mut self,
        parent: &dyn Archive,
        entry: EntryId,
        silent: bool,
    ) -> Result<ArchiveId> {
        let entry_ref = EntryRef::new(parent.id(), entry);
        if let Some(id) = self.find_by_parent_entry(entry_ref) {
            self.announce_opened(id, silent);
            return Ok(id);
        }
        let archive = Self::load_entry(parent, entry)?;
        Ok(self.adopt(entry_ref, archive, silent))
    }

    /// Loads the archive stored in an entry without registering it.
    pub fn open_entry_unmanaged(&self, entry: EntryRef) -> Result<Box<dyn Archive>> {
        let parent = self
            .lookup_archive(entry.archive)
            .ok_or(Error::InvalidHandle(entry.archive))?;
        Self::load_entry(parent, entry.entry)
    }

    /// Creates and registers a new, empty archive.
    ///
    /// Only [`Event::ArchiveAdded`] is published; the archive has no file
    /// behind it until it is saved with a destination.
    pub fn new_archive(&mut self, format: FormatId) -> Result<ArchiveId> {
        let desc = format.desc();
        if !desc.creatable {
            return Err(Error::CannotCreate {
                format: format.to_string(),
            });
        }
        let mut archive = (desc.create)();
        archive
            .core_mut()
            .set_filename(format!("UNSAVED ({})", desc.name));
        Ok(self.track(archive, None, true))
    }

    fn find_by_parent_entry(&self, entry: EntryRef) -> Option<ArchiveId> {
        self.records
            .iter()
            .find(|r| r.archive.parent_entry() == Some(entry))
            .map(|r| r.archive.id())
    }

    fn announce_opened(&mut self, id: ArchiveId, silent: bool) {
        if silent {
            return;
        }
        if let Some(index) = self.index_of(id) {
            self.events.publish(Event::ArchiveOpened { index });
        }
    }

    fn load_path(path: &Path, is_dir: bool) -> Result<Box<dyn Archive>> {
        let format = if is_dir {
            FormatId::Folder
        } else {
            format::identify_path(path)
                .ok_or_else(|| Error::unsupported_format(path.display().to_string()))?
        };
        Self::load_archive(format, Source::Path(path))
    }

    fn load_entry(parent: &dyn Archive, entry: EntryId) -> Result<Box<dyn Archive>> {
        let node = parent
            .tree()
            .get(entry)
            .filter(|node| !node.is_dir())
            .ok_or_else(|| Error::EntryNotFound {
                path: format!("{} in {}", entry, parent.filename()),
            })?;
        let source = Source::Entry {
            parent: EntryRef::new(parent.id(), entry),
            name: node.name(),
            data: node.data().unwrap_or_default(),
        };
        let format = format::identify(&source)
            .ok_or_else(|| Error::unsupported_format(source.describe()))?;
        Self::load_archive(format, source)
    }

    pub(super) fn load_archive(format: FormatId, source: Source<'_>) -> Result<Box<dyn Archive>> {
        let mut archive = (format.desc().create)();
        if let Err(e) = archive.load(source) {
            error!("failed to open {} as {}: {}", source.describe(), format, e);
            return Err(e);
        }
        Ok(archive)
    }

    /// Registers an archive loaded from `entry`, linking it under the entry's
    /// archive when that one is registered.
    fn adopt(&mut self, entry: EntryRef, archive: Box<dyn Archive>, silent: bool) -> ArchiveId {
        let parent = self.contains(entry.archive).then_some(entry.archive);
        if parent.is_none() {
            self.warn(Error::OrphanedNesting { entry });
        }
        self.track(archive, parent, silent)
    }

    /// Appends a record for `archive`, publishes its arrival and mounts its
    /// embedded archives.
    fn track(
        &mut self,
        mut archive: Box<dyn Archive>,
        parent: Option<ArchiveId>,
        silent: bool,
    ) -> ArchiveId {
        let id = archive.id();
        let format = archive.format_id();
        let (subscription, inbox) = archive.events().subscribe_inbox();
        info!("opened {} archive {} as {}", format, archive.filename(), id);

        self.records.push(OpenArchive {
            archive,
            resource: true,
            children: Vec::new(),
            inbox,
            subscription,
        });
        if let Some(record) = parent.and_then(|parent| self.record_mut(parent)) {
            record.children.push(id);
        }
        self.events.publish(Event::ArchiveAdded);

        let index = self.records.len() - 1;
        self.pool.add_archive(id, &*self.records[index].archive);

        if format.desc().root_mounts && self.config.auto_mount_embedded {
            self.mount_embedded(id);
        }
        if !silent {
            self.events.publish(Event::ArchiveOpened { index });
        }
        id
    }

    /// Opens every root-level file of `id` whose contents sniff as an
    /// embeddable format. Failures are recorded as warnings.
    fn mount_embedded(&mut self, id: ArchiveId) {
        let Some(archive) = self.archive(id) else {
            return;
        };
        let tree = archive.tree();
        let candidates: Vec<EntryId> = tree
            .root_files()
            .into_iter()
            .filter(|&entry| {
                tree.data(entry)
                    .and_then(format::identify_bytes)
                    .is_some_and(|format| format.desc().embeddable)
            })
            .collect();

        for entry in candidates {
            let entry = EntryRef::new(id, entry);
            debug!("mounting embedded archive {}", entry);
            if let Err(e) = self.open_entry(entry, true) {
                self.warn(e);
            }
        }
    }
}
