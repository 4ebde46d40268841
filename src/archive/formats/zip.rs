//! Zip and PK3 archives, backed by the `zip` crate.

use std::io::{self, Cursor, Read, Write};

use ::zip::CompressionMethod;
use ::zip::result::ZipError;
use ::zip::write::FileOptions;

use super::{add_named, install};
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::FormatId;
use crate::tree::EntryTree;
use crate::{EntryPath, Error, Result};

/// A Zip (or PK3) archive with a full directory hierarchy.
#[derive(Debug)]
pub struct ZipArchive {
    core: ArchiveCore,
}

impl Default for ZipArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipArchive {
    /// Creates an empty zip archive.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Zip),
        }
    }

    fn parse(data: &[u8]) -> Result<EntryTree> {
        let fail = |e: ZipError| Error::load_failure("zip", e.to_string());
        let mut zip = ::zip::ZipArchive::new(Cursor::new(data)).map_err(fail)?;

        let mut tree = EntryTree::new();
        for index in 0..zip.len() {
            let mut file = zip.by_index(index).map_err(fail)?;
            let name = file.name().to_string();
            if file.is_dir() {
                match EntryPath::new(name.trim_end_matches('/')) {
                    Ok(path) => {
                        tree.add_dir(&path);
                    }
                    Err(e) => log::warn!("skipping zip directory {:?}: {}", name, e),
                }
                continue;
            }
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .map_err(|e| Error::load_failure("zip", format!("{}: {}", name, e)))?;
            add_named(&mut tree, "zip", &name, content);
        }
        Ok(tree)
    }
}

fn write_error(e: ZipError) -> Error {
    match e {
        ZipError::Io(e) => Error::Io(e),
        other => Error::Io(io::Error::other(other)),
    }
}

impl Archive for ZipArchive {
    fn core(&self) -> &ArchiveCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ArchiveCore {
        &mut self.core
    }

    fn load(&mut self, source: Source<'_>) -> Result<()> {
        let bytes = source.bytes()?;
        let tree = Self::parse(&bytes)?;
        install(&mut self.core, &source, tree)
    }

    fn write(&self) -> Result<Vec<u8>> {
        let tree = self.tree();
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));

        for id in tree.walk(tree.root()) {
            let (Some(node), Some(path)) = (tree.get(id), tree.path_of(id)) else {
                continue;
            };
            match node.data() {
                None => writer.add_directory(path, options).map_err(write_error)?,
                Some(data) => {
                    writer.start_file(path, options).map_err(write_error)?;
                    writer.write_all(data)?;
                }
            }
        }

        let cursor = writer.finish().map_err(write_error)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::EntryRef;
    use crate::{ArchiveId, EntryId};

    #[test]
    fn test_write_then_load_keeps_hierarchy() {
        let mut zip = ZipArchive::new();
        zip.add_entry("maps/MAP01.wad", b"PWAD".to_vec()).unwrap();
        zip.add_entry("decorate.txt", b"actor".to_vec()).unwrap();
        zip.core_mut()
            .tree_mut()
            .add_dir(&EntryPath::new("empty").unwrap());
        let bytes = zip.write().unwrap();

        let mut loaded = ZipArchive::new();
        loaded
            .load(Source::Entry {
                parent: EntryRef::new(ArchiveId::next(), EntryId::from_raw(1)),
                name: "inner.pk3",
                data: &bytes,
            })
            .unwrap();
        let tree = loaded.tree();
        let map = tree.entry_at_path("MAPS/map01.wad").unwrap();
        assert_eq!(tree.data(map).unwrap(), b"PWAD");
        assert!(loaded.entry("decorate.txt").is_some());
        assert!(tree.is_dir(tree.entry_at_path("empty").unwrap()));
    }

    #[test]
    fn test_empty_archive_round_trip() {
        let bytes = ZipArchive::new().write().unwrap();
        assert!(crate::format::detect::is_zip(&mut Cursor::new(&bytes)));
    }

    #[test]
    fn test_garbage_is_load_failure() {
        let mut zip = ZipArchive::new();
        let err = zip
            .load(Source::Entry {
                parent: EntryRef::new(ArchiveId::next(), EntryId::from_raw(1)),
                name: "bad.zip",
                data: b"PK\x03\x04garbage",
            })
            .unwrap_err();
        assert!(err.is_format_error());
    }
}
