//! Quake WAD2 and Half-Life WAD3 texture archives (read only).
//!
//! Same header shape as a Doom WAD, but 32-byte directory records: offset,
//! stored size, full size, type, compression flag, padding and a 16-byte
//! name. Compressed lumps are kept as stored.

use super::{fixed_name, install, le_i32, lump_path, span};
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::{FormatId, magic};
use crate::tree::EntryTree;
use crate::{Error, Result};

const DIR_ENTRY_SIZE: usize = 32;

/// A Quake WAD2 / Half-Life WAD3 archive.
#[derive(Debug)]
pub struct Wad2Archive {
    core: ArchiveCore,
}

impl Default for Wad2Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl Wad2Archive {
    /// Creates an empty, unloaded WAD2 archive.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Wad2),
        }
    }

    fn parse(data: &[u8]) -> Result<EntryTree> {
        let fail = |reason: String| Error::load_failure("wad2", reason);

        if data.len() < 12 || (&data[..4] != magic::WAD2 && &data[..4] != magic::WAD3) {
            return Err(fail("not a wad2 file".into()));
        }
        let count = le_i32(data, 4).unwrap_or(-1);
        let dir_offset = le_i32(data, 8).unwrap_or(-1);
        let directory = span(
            data,
            i64::from(dir_offset),
            i64::from(count) * DIR_ENTRY_SIZE as i64,
        )
        .ok_or_else(|| fail("directory out of bounds".into()))?;

        let mut tree = EntryTree::new();
        for record in directory.chunks_exact(DIR_ENTRY_SIZE) {
            let offset = le_i32(record, 0).unwrap_or(-1);
            let stored = le_i32(record, 4).unwrap_or(-1);
            let name = fixed_name(&record[16..32]);
            if record[13] != 0 {
                log::debug!("wad2 lump {} is compressed, kept as stored", name);
            }
            let content = span(data, i64::from(offset), i64::from(stored))
                .ok_or_else(|| fail(format!("lump {} out of bounds", name)))?;
            tree.add_file(&lump_path(&name), content.to_vec());
        }
        Ok(tree)
    }
}

impl Archive for Wad2Archive {
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
}
