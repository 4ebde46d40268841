//! Resource resolution across registered archives and the base archive.
//!
//! [`Registry::find_first`] checks registered resource archives in
//! registration order and falls back to the base archive last, so loaded
//! archives override the base game data. [`Registry::find_all`] lists base
//! archive matches first. Both skip archives whose resource flag is off and
//! the archive passed as `excluding`.

use super::Registry;
use crate::archive::{Archive, ArchiveId, EntryRef};
use crate::search::SearchOptions;
use crate::{Error, Result};

/// What [`Registry::find_first`] looks for.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    /// An entry name, or a `/`-separated path, resolved with
    /// [`Archive::entry`].
    Name(&'a str),
    /// A search, resolved with [`Archive::find_last`].
    Query(&'a SearchOptions),
}

impl<'a> From<&'a str> for Lookup<'a> {
    fn from(name: &'a str) -> Self {
        Lookup::Name(name)
    }
}

impl<'a> From<&'a String> for Lookup<'a> {
    fn from(name: &'a String) -> Self {
        Lookup::Name(name)
    }
}

impl<'a> From<&'a SearchOptions> for Lookup<'a> {
    fn from(options: &'a SearchOptions) -> Self {
        Lookup::Query(options)
    }
}

impl Lookup<'_> {
    fn find_in(&self, archive: &dyn Archive) -> Option<EntryRef> {
        let entry = match *self {
            Lookup::Name(name) => archive.entry(name),
            Lookup::Query(options) => archive.find_last(options),
        }?;
        Some(EntryRef::new(archive.id(), entry))
    }
}

impl Registry {
    /// Returns a registered archive or the loaded base archive.
    pub(super) fn lookup_archive(&self, id: ArchiveId) -> Option<&dyn Archive> {
        self.archive(id)
            .or_else(|| self.base.archive().filter(|base| base.id() == id))
    }

    fn resource_archives(&self, excluding: Option<ArchiveId>) -> impl Iterator<Item = &dyn Archive> {
        self.records
            .iter()
            .filter(move |r| r.resource && Some(r.archive.id()) != excluding)
            .map(|r| &*r.archive)
    }

    /// Finds the first resource entry matching `lookup`.
    ///
    /// ```rust,no_run
    /// # use arcmgr::{Registry, RegistryConfig, SearchOptions};
    /// # let registry = Registry::new(RegistryConfig::default());
    /// let by_name = registry.find_first("PLAYPAL", None);
    /// let query = SearchOptions::new().name("D_*").namespace("music");
    /// let by_query = registry.find_first(&query, None);
    /// ```
    pub fn find_first<'a>(
        &self,
        lookup: impl Into<Lookup<'a>>,
        excluding: Option<ArchiveId>,
    ) -> Option<EntryRef> {
        let lookup = lookup.into();
        self.resource_archives(excluding)
            .find_map(|archive| lookup.find_in(archive))
            .or_else(|| {
                self.base
                    .archive()
                    .filter(|base| Some(base.id()) != excluding)
                    .and_then(|base| lookup.find_in(base))
            })
    }

    /// Finds every resource entry matching `options`, base archive first.
    pub fn find_all(&self, options: &SearchOptions, excluding: Option<ArchiveId>) -> Vec<EntryRef> {
        let base = self
            .base
            .archive()
            .filter(|base| Some(base.id()) != excluding);
        base.into_iter()
            .chain(self.resource_archives(excluding))
            .flat_map(|archive| {
                let id = archive.id();
                archive
                    .find_all(options)
                    .into_iter()
                    .map(move |entry| EntryRef::new(id, entry))
            })
            .collect()
    }

    /// Returns the bytes of an entry of a registered archive or of the base
    /// archive.
    pub fn entry_data(&self, entry: EntryRef) -> Result<&[u8]> {
        let archive = self
            .lookup_archive(entry.archive)
            .ok_or(Error::InvalidHandle(entry.archive))?;
        archive
            .tree()
            .data(entry.entry)
            .ok_or_else(|| Error::EntryNotFound {
                path: entry.to_string(),
            })
    }

    /// Returns the full path of an entry inside its archive.
    pub fn entry_path(&self, entry: EntryRef) -> Result<String> {
        let archive = self
            .lookup_archive(entry.archive)
            .ok_or(Error::InvalidHandle(entry.archive))?;
        archive
            .tree()
            .path_of(entry.entry)
            .ok_or_else(|| Error::EntryNotFound {
                path: entry.to_string(),
            })
    }
}
