//! Quake PAK archives (read only).
//!
//! Layout: `PACK`, directory offset, directory size; the directory is a run
//! of 64-byte records holding a 56-byte path, data offset and size.

use super::{add_named, fixed_name, install, le_i32, span};
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::{FormatId, magic};
use crate::tree::EntryTree;
use crate::{Error, Result};

const DIR_ENTRY_SIZE: usize = 64;
const NAME_SIZE: usize = 56;

/// A Quake PAK archive.
#[derive(Debug)]
pub struct PakArchive {
    core: ArchiveCore,
}

impl Default for PakArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl PakArchive {
    /// Creates an empty, unloaded PAK archive.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Pak),
        }
    }

    fn parse(data: &[u8]) -> Result<EntryTree> {
        let fail = |reason: String| Error::load_failure("pak", reason);

        if data.len() < 12 || &data[..4] != magic::PACK {
            return Err(fail("not a pak file".into()));
        }
        let dir_offset = le_i32(data, 4).unwrap_or(-1);
        let dir_size = le_i32(data, 8).unwrap_or(-1);
        if dir_size % DIR_ENTRY_SIZE as i32 != 0 {
            return Err(fail(format!("directory size {} is not a multiple of 64", dir_size)));
        }
        let directory = span(data, i64::from(dir_offset), i64::from(dir_size))
            .ok_or_else(|| fail("directory out of bounds".into()))?;

        let mut tree = EntryTree::new();
        for record in directory.chunks_exact(DIR_ENTRY_SIZE) {
            let name = fixed_name(&record[..NAME_SIZE]);
            let offset = le_i32(record, NAME_SIZE).unwrap_or(-1);
            let size = le_i32(record, NAME_SIZE + 4).unwrap_or(-1);
            let content = span(data, i64::from(offset), i64::from(size))
                .ok_or_else(|| fail(format!("entry {} out of bounds", name)))?;
            add_named(&mut tree, "pak", &name, content.to_vec());
        }
        Ok(tree)
    }
}

impl Archive for PakArchive {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn pak(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut directory = Vec::new();
        for (name, data) in entries {
            let mut field = [0u8; NAME_SIZE];
            field[..name.len()].copy_from_slice(name.as_bytes());
            directory.extend_from_slice(&field);
            directory.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
            directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
            body.extend_from_slice(data);
        }
        let mut out = b"PACK".to_vec();
        out.extend_from_slice(&((12 + body.len()) as i32).to_le_bytes());
        out.extend_from_slice(&(directory.len() as i32).to_le_bytes());
        out.extend_from_slice(&body);
        out.extend_from_slice(&directory);
        out
    }

    #[test]
    fn test_parse_nested_paths() {
        let data = pak(&[("maps/e1m1.bsp", b"bsp"), ("progs.dat", b"qc")]);
        let tree = PakArchive::parse(&data).unwrap();
        let bsp = tree.entry_at_path("maps/e1m1.bsp").unwrap();
        assert_eq!(tree.data(bsp).unwrap(), b"bsp");
        assert!(tree.entry("progs.dat").is_some());
    }

    #[test]
    fn test_entry_out_of_bounds() {
        let mut data = pak(&[("a", b"12345")]);
        let len = data.len();
        // size field of the only record
        data[len - 4..].copy_from_slice(&1000i32.to_le_bytes());
        assert!(PakArchive::parse(&data).is_err());
    }
}
