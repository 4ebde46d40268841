//! Single-file bzip2 containers.

use std::io;

use super::gzip::single_entry_path;
use super::install;
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::FormatId;
use crate::tree::EntryTree;
use crate::{Error, Result};

/// A bzip2-compressed single file.
#[derive(Debug)]
pub struct Bzip2Archive {
    core: ArchiveCore,
}

impl Default for Bzip2Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl Bzip2Archive {
    /// Creates an empty, unloaded bzip2 container.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Bzip2),
        }
    }
}

#[cfg(feature = "bzip2")]
fn decode(data: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Read;

    let mut out = Vec::new();
    ::bzip2::read::BzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(not(feature = "bzip2"))]
fn decode(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "built without bzip2 support",
    ))
}

impl Archive for Bzip2Archive {
    fn core(&self) -> &ArchiveCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ArchiveCore {
        &mut self.core
    }

    fn load(&mut self, source: Source<'_>) -> Result<()> {
        let bytes = source.bytes()?;
        let data = decode(&bytes).map_err(|e| Error::load_failure("bzip2", e.to_string()))?;

        let mut tree = EntryTree::new();
        tree.add_file(&single_entry_path(None, &source.name(), ".bz2"), data);
        install(&mut self.core, &source, tree)
    }
}
