//! Doom WAD archives.
//!
//! Layout: a 12-byte header (`IWAD`/`PWAD`, lump count, directory offset),
//! lump data, and a directory of 16-byte records (offset, size, 8-byte name).
//! WADs are flat: every lump lives in the root directory.

use super::{fixed_name, install, le_i32, lump_path, span};
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::{FormatId, magic};
use crate::tree::EntryTree;
use crate::{Error, Result};

const HEADER_SIZE: usize = 12;
const DIR_ENTRY_SIZE: usize = 16;
const NAME_SIZE: usize = 8;

/// A Doom WAD archive.
#[derive(Debug)]
pub struct WadArchive {
    core: ArchiveCore,
    iwad: bool,
}

impl Default for WadArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl WadArchive {
    /// Creates an empty PWAD.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Wad),
            iwad: false,
        }
    }

    /// Returns `true` if this is an IWAD (a main game data file).
    pub fn is_iwad(&self) -> bool {
        self.iwad
    }

    fn parse(data: &[u8]) -> Result<(EntryTree, bool)> {
        let fail = |reason: &str| Error::load_failure("wad", reason);

        if data.len() < HEADER_SIZE {
            return Err(fail("file too small for a wad header"));
        }
        let iwad = match &data[..4] {
            m if m == magic::IWAD => true,
            m if m == magic::PWAD => false,
            _ => return Err(fail("bad magic")),
        };
        let count = le_i32(data, 4).ok_or_else(|| fail("truncated header"))?;
        let dir_offset = le_i32(data, 8).ok_or_else(|| fail("truncated header"))?;
        let directory = span(
            data,
            i64::from(dir_offset),
            i64::from(count) * DIR_ENTRY_SIZE as i64,
        )
        .ok_or_else(|| fail("directory out of bounds"))?;

        let mut tree = EntryTree::new();
        for record in directory.chunks_exact(DIR_ENTRY_SIZE) {
            let offset = le_i32(record, 0).unwrap_or(-1);
            let size = le_i32(record, 4).unwrap_or(-1);
            let name = fixed_name(&record[8..8 + NAME_SIZE]);
            let lump = span(data, i64::from(offset), i64::from(size)).ok_or_else(|| {
                Error::load_failure("wad", format!("lump {} out of bounds", name))
            })?;
            tree.add_file(&lump_path(&name), lump.to_vec());
        }
        Ok((tree, iwad))
    }
}

impl Archive for WadArchive {
    fn core(&self) -> &ArchiveCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ArchiveCore {
        &mut self.core
    }

    fn load(&mut self, source: Source<'_>) -> Result<()> {
        let bytes = source.bytes()?;
        let (tree, iwad) = Self::parse(&bytes)?;
        install(&mut self.core, &source, tree)?;
        self.iwad = iwad;
        Ok(())
    }

    fn write(&self) -> Result<Vec<u8>> {
        let tree = self.tree();
        let lumps = tree.files();

        let mut body = Vec::new();
        let mut directory = Vec::with_capacity(lumps.len() * DIR_ENTRY_SIZE);
        for id in &lumps {
            let Some(node) = tree.get(*id) else { continue };
            let data = node.data().unwrap_or_default();
            let offset = HEADER_SIZE + body.len();
            directory.extend_from_slice(&(offset as i32).to_le_bytes());
            directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
            let mut name = [0u8; NAME_SIZE];
            let raw = node.name().as_bytes();
            let len = raw.len().min(NAME_SIZE);
            name[..len].copy_from_slice(&raw[..len]);
            directory.extend_from_slice(&name);
            body.extend_from_slice(data);
        }

        let mut out = Vec::with_capacity(HEADER_SIZE + body.len() + directory.len());
        out.extend_from_slice(if self.iwad { magic::IWAD } else { magic::PWAD });
        out.extend_from_slice(&(lumps.len() as i32).to_le_bytes());
        out.extend_from_slice(&((HEADER_SIZE + body.len()) as i32).to_le_bytes());
        out.extend_from_slice(&body);
        out.extend_from_slice(&directory);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::EntryRef;
    use crate::{ArchiveId, EntryId};

    fn entry_source(data: &[u8]) -> Source<'_> {
        Source::Entry {
            parent: EntryRef::new(ArchiveId::next(), EntryId::from_raw(1)),
            name: "test.wad",
            data,
        }
    }

    #[test]
    fn test_write_then_load() {
        let mut wad = WadArchive::new();
        wad.add_entry("PLAYPAL", vec![1, 2, 3]).unwrap();
        wad.add_entry("MAP01", vec![]).unwrap();
        wad.add_entry("THINGS", vec![9; 20]).unwrap();
        let bytes = wad.write().unwrap();
        assert_eq!(&bytes[..4], b"PWAD");

        let mut loaded = WadArchive::new();
        loaded.load(entry_source(&bytes)).unwrap();
        let names: Vec<_> = loaded
            .tree()
            .files()
            .into_iter()
            .map(|id| loaded.tree().path_of(id).unwrap())
            .collect();
        assert_eq!(names, vec!["PLAYPAL", "MAP01", "THINGS"]);
        let things = loaded.entry("things").unwrap();
        assert_eq!(loaded.tree().data(things).unwrap(), &[9; 20][..]);
        assert!(!loaded.is_modified());
    }

    #[test]
    fn test_lump_out_of_bounds() {
        let mut data = b"PWAD".to_vec();
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&12i32.to_le_bytes());
        data.extend_from_slice(&100i32.to_le_bytes());
        data.extend_from_slice(&4i32.to_le_bytes());
        data.extend_from_slice(b"BROKEN\0\0");

        let mut wad = WadArchive::new();
        let err = wad.load(entry_source(&data)).unwrap_err();
        assert!(matches!(err, Error::LoadFailure { format: "wad", .. }));
        assert!(wad.tree().is_empty());
        assert_eq!(wad.filename(), "");
    }

    #[test]
    fn test_iwad_preserved() {
        let mut data = b"IWAD".to_vec();
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&12i32.to_le_bytes());
        let mut wad = WadArchive::new();
        wad.load(entry_source(&data)).unwrap();
        assert!(wad.is_iwad());
        assert_eq!(&wad.write().unwrap()[..4], b"IWAD");
    }
}
