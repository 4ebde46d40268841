//! Base resource selection.

use std::path::{Path, PathBuf};

use log::{info, warn};

use super::Registry;
use crate::archive::{Archive, ArchiveId, EntryRef, Source};
use crate::check;
use crate::event::Event;
use crate::format::{self, FormatId};
use crate::tree::EntryId;
use crate::{Error, Result};

/// Formats a base resource may be in.
const BASE_FORMATS: &[FormatId] = &[FormatId::Wad, FormatId::Zip];

impl Registry {
    /// Loads the base resource configured at construction.
    pub fn init_base_resource(&mut self) -> bool {
        let index = self.config.base_resource;
        self.open_base_resource(index)
    }

    /// Switches the base resource to the path at `index`, or unloads it for
    /// `None`.
    ///
    /// Returns `true` if the requested resource is loaded afterwards. Asking
    /// for the index that is already loaded does nothing. Any other request
    /// unloads the current base archive first, so a failed load leaves no
    /// base resource. [`Event::BaseResourceChanged`] follows every request
    /// that got that far.
    pub fn open_base_resource(&mut self, index: Option<usize>) -> bool {
        if index.is_some() && index == self.base.index() {
            return true;
        }
        self.unload_base_resource();

        let loaded = index.is_some_and(|index| self.load_base_resource(index));
        self.events.publish(Event::BaseResourceChanged);
        loaded
    }

    fn load_base_resource(&mut self, index: usize) -> bool {
        let Some(path) = self.base.path(index).map(Path::to_path_buf) else {
            warn!("no base resource at index {}", index);
            return false;
        };
        let source = Source::Path(path.as_path());
        let Some(format) = format::identify_restricted(&source, BASE_FORMATS) else {
            warn!("{} is not a wad or zip file", path.display());
            return false;
        };
        match Self::load_archive(format, source) {
            Ok(archive) => {
                info!("loaded base resource {}", path.display());
                self.pool.add_archive(archive.id(), &*archive);
                self.base.set_active(index, archive);
                true
            }
            Err(e) => {
                warn!("cannot load base resource {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Drops the loaded base archive without publishing anything.
    pub(super) fn unload_base_resource(&mut self) {
        if let Some(mut archive) = self.base.take_active() {
            self.pool.remove_archive(archive.id());
            archive.close();
        }
    }

    /// Appends a candidate base resource path.
    ///
    /// Returns `false` if `path` is not an existing file or is already listed.
    pub fn add_base_resource_path(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if !path.is_file() {
            return false;
        }
        let Ok(normalized) = crate::fs::normalize_path_buf(path) else {
            return false;
        };
        if !self.base.push(normalized) {
            return false;
        }
        self.events.publish(Event::BaseResourcePathAdded);
        true
    }

    /// Removes the candidate path at `index`, unloading it first if it is the
    /// active base resource.
    pub fn remove_base_resource_path(&mut self, index: usize) -> bool {
        if index >= self.base.len() {
            return false;
        }
        if self.base.index() == Some(index) {
            self.open_base_resource(None);
        }
        self.base.remove(index);
        self.events.publish(Event::BaseResourcePathRemoved);
        true
    }

    /// Returns the candidate path at `index`.
    pub fn base_resource_path(&self, index: usize) -> Option<&Path> {
        self.base.path(index)
    }

    /// Returns every candidate path.
    pub fn base_resource_paths(&self) -> &[PathBuf] {
        self.base.paths()
    }

    /// Returns the index of the loaded base resource.
    pub fn base_resource_index(&self) -> Option<usize> {
        self.base.index()
    }

    /// Returns the loaded base archive.
    pub fn base_resource_archive(&self) -> Option<&dyn Archive> {
        self.base.archive()
    }

    /// Removes every file of a registered archive that the loaded base
    /// resource carries unchanged, returning the removed paths.
    ///
    /// See [`check::entries_unchanged_from`] for what counts as unchanged.
    /// Nothing is removed when no base resource is loaded or when `id` is
    /// the base archive itself. Removal goes through
    /// [`remove_entry`](Self::remove_entry), so bookmarks on the removed
    /// files are dropped as well.
    pub fn remove_entries_unchanged_from_base(&mut self, id: ArchiveId) -> Result<Vec<String>> {
        let Some(base) = self.base.archive() else {
            return Ok(Vec::new());
        };
        if base.id() == id {
            return Ok(Vec::new());
        }
        let archive = self.archive(id).ok_or(Error::InvalidHandle(id))?;
        let unchanged: Vec<(EntryId, String)> = check::entries_unchanged_from(archive, base)
            .into_iter()
            .filter_map(|entry| Some((entry, archive.tree().path_of(entry)?)))
            .collect();

        let mut removed = Vec::with_capacity(unchanged.len());
        for (entry, path) in unchanged {
            self.remove_entry(EntryRef::new(id, entry))?;
            removed.push(path);
        }
        if !removed.is_empty() {
            info!(
                "removed {} entries unchanged from the base resource from {}",
                removed.len(),
                id
            );
        }
        Ok(removed)
    }
}
