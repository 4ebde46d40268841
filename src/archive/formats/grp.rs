//! Build engine GRP archives (read only).
//!
//! Layout: `KenSilverman`, a file count, `count` 16-byte records (12-byte
//! name, size), then every file's data back to back in directory order.

use super::{fixed_name, install, le_u32, lump_path};
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::{FormatId, magic};
use crate::tree::EntryTree;
use crate::{Error, Result};

const RECORD_SIZE: usize = 16;
const NAME_SIZE: usize = 12;

/// A Build engine GRP archive.
#[derive(Debug)]
pub struct GrpArchive {
    core: ArchiveCore,
}

impl Default for GrpArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl GrpArchive {
    /// Creates an empty, unloaded GRP archive.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Grp),
        }
    }

    fn parse(data: &[u8]) -> Result<EntryTree> {
        let fail = |reason: String| Error::load_failure("grp", reason);

        if data.len() < RECORD_SIZE || &data[..NAME_SIZE] != magic::KEN_SILVERMAN {
            return Err(fail("not a grp file".into()));
        }
        let count = le_u32(data, NAME_SIZE).unwrap_or(0) as usize;
        let records_end = count
            .checked_add(1)
            .and_then(|n| n.checked_mul(RECORD_SIZE))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| fail("directory out of bounds".into()))?;

        let mut tree = EntryTree::new();
        let mut offset = records_end;
        for record in data[RECORD_SIZE..records_end].chunks_exact(RECORD_SIZE) {
            let name = fixed_name(&record[..NAME_SIZE]);
            let size = le_u32(record, NAME_SIZE).unwrap_or(0) as usize;
            let content = offset
                .checked_add(size)
                .and_then(|end| data.get(offset..end))
                .ok_or_else(|| fail(format!("entry {} out of bounds", name)))?;
            tree.add_file(&lump_path(&name), content.to_vec());
            offset += size;
        }
        Ok(tree)
    }
}

impl Archive for GrpArchive {
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

    #[test]
    fn test_parse_sequential_data() {
        let mut data = b"KenSilverman".to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        for (name, size) in [("TILES000.ART", 3u32), ("GAME.CON", 2)] {
            let mut field = [0u8; NAME_SIZE];
            field[..name.len()].copy_from_slice(name.as_bytes());
            data.extend_from_slice(&field);
            data.extend_from_slice(&size.to_le_bytes());
        }
        data.extend_from_slice(b"artcn");

        let tree = GrpArchive::parse(&data).unwrap();
        assert_eq!(tree.data(tree.entry("tiles000.art").unwrap()).unwrap(), b"art");
        assert_eq!(tree.data(tree.entry("GAME.CON").unwrap()).unwrap(), b"cn");

        data.pop();
        assert!(GrpArchive::parse(&data).is_err());
    }
}
