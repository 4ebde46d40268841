//! Single-file gzip containers.
//!
//! The decompressed payload becomes the archive's only entry, named after the
//! name stored in the gzip header, or the container's own name minus `.gz`.

use std::io;

use super::install;
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::FormatId;
use crate::tree::EntryTree;
use crate::{EntryPath, Error, Result};

/// A gzip-compressed single file.
#[derive(Debug)]
pub struct GzipArchive {
    core: ArchiveCore,
}

impl Default for GzipArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipArchive {
    /// Creates an empty, unloaded gzip container.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Gzip),
        }
    }
}

#[cfg(feature = "gzip")]
fn decode(data: &[u8]) -> io::Result<(Vec<u8>, Option<String>)> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    let stored = decoder
        .header()
        .and_then(|h| h.filename())
        .map(|n| String::from_utf8_lossy(n).into_owned());
    Ok((out, stored))
}

#[cfg(not(feature = "gzip"))]
fn decode(_data: &[u8]) -> io::Result<(Vec<u8>, Option<String>)> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "built without gzip support",
    ))
}

/// Picks the entry name for a single-file container.
pub(super) fn single_entry_path(stored: Option<&str>, container: &str, suffix: &str) -> EntryPath {
    let from_container = || {
        let name = crate::fs::file_name(container);
        let cut = name.len().saturating_sub(suffix.len());
        match name.get(cut..) {
            Some(tail) if cut > 0 && tail.eq_ignore_ascii_case(suffix) => name[..cut].to_string(),
            _ => name.to_string(),
        }
    };
    stored
        .map(|s| crate::fs::file_name(&crate::fs::forward_slashes(s)).to_string())
        .filter(|s| !s.is_empty())
        .and_then(|s| EntryPath::new(&s).ok())
        .or_else(|| EntryPath::new(&from_container()).ok())
        .unwrap_or_else(EntryPath::placeholder)
}

impl Archive for GzipArchive {
    fn core(&self) -> &ArchiveCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ArchiveCore {
        &mut self.core
    }

    fn load(&mut self, source: Source<'_>) -> Result<()> {
        let bytes = source.bytes()?;
        let (data, stored) =
            decode(&bytes).map_err(|e| Error::load_failure("gzip", e.to_string()))?;

        let mut tree = EntryTree::new();
        let path = single_entry_path(stored.as_deref(), &source.name(), ".gz");
        tree.add_file(&path, data);
        install(&mut self.core, &source, tree)
    }
}

#[cfg(all(test, feature = "gzip"))]
mod tests {
    use super::*;
    use crate::archive::EntryRef;
    use crate::{ArchiveId, EntryId};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn test_single_entry_named_after_container() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"PWAD....").unwrap();
        let data = encoder.finish().unwrap();

        let mut gz = GzipArchive::new();
        gz.load(Source::Entry {
            parent: EntryRef::new(ArchiveId::next(), EntryId::from_raw(1)),
            name: "doom.wad.gz",
            data: &data,
        })
        .unwrap();
        let entry = gz.entry("doom.wad").unwrap();
        assert_eq!(gz.tree().data(entry).unwrap(), b"PWAD....");
    }

    #[test]
    fn test_single_entry_path_rules() {
        assert_eq!(single_entry_path(None, "a/MAP.GZ", ".gz").as_str(), "MAP");
        assert_eq!(
            single_entry_path(Some("dir\\x.txt"), "c.gz", ".gz").as_str(),
            "x.txt"
        );
        assert_eq!(single_entry_path(None, ".gz", ".gz").as_str(), ".gz");
    }
}
