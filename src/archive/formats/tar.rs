//! POSIX / GNU tar archives (read only).
//!
//! Regular files and directories are loaded; links, devices and extended
//! headers are skipped. GNU long names (`L` records) are honored.

use super::{add_named, fixed_name, install};
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::detect::{TAR_BLOCK, header_checksum, parse_octal};
use crate::format::{FormatId, magic};
use crate::tree::EntryTree;
use crate::{EntryPath, Error, Result};

/// A tar archive.
#[derive(Debug)]
pub struct TarArchive {
    core: ArchiveCore,
}

impl Default for TarArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl TarArchive {
    /// Creates an empty, unloaded tar archive.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Tar),
        }
    }

    fn parse(data: &[u8]) -> Result<EntryTree> {
        let fail = |reason: String| Error::load_failure("tar", reason);

        let mut tree = EntryTree::new();
        let mut long_name: Option<String> = None;
        let mut pos = 0;
        while let Some(chunk) = data.get(pos..pos + TAR_BLOCK) {
            let Ok(block) = <&[u8; TAR_BLOCK]>::try_from(chunk) else {
                break;
            };
            if block.iter().all(|&b| b == 0) {
                break;
            }
            if parse_octal(&block[148..156]) != Some(header_checksum(block)) {
                return Err(fail(format!("bad header checksum at offset {}", pos)));
            }

            let mut name = fixed_name(&block[..100]);
            if &block[257..262] == magic::USTAR {
                let prefix = fixed_name(&block[345..500]);
                if !prefix.is_empty() {
                    name = format!("{}/{}", prefix, name);
                }
            }
            if let Some(long) = long_name.take() {
                name = long;
            }

            let size = match parse_octal(&block[124..136]) {
                Some(size) => usize::try_from(size).map_err(|_| fail("entry too large".into()))?,
                None if block[124..136].iter().all(|&b| b == 0 || b == b' ') => 0,
                None => return Err(fail(format!("bad size field for {}", name))),
            };
            let start = pos + TAR_BLOCK;
            let content = start
                .checked_add(size)
                .and_then(|end| data.get(start..end))
                .ok_or_else(|| fail(format!("entry {} truncated", name)))?;

            match block[156] {
                b'0' | 0 | b'7' => add_named(&mut tree, "tar", &name, content.to_vec()),
                b'5' => match EntryPath::new(name.trim_end_matches('/')) {
                    Ok(path) => {
                        tree.add_dir(&path);
                    }
                    Err(e) => log::warn!("skipping tar directory {:?}: {}", name, e),
                },
                b'L' => long_name = Some(fixed_name(content)),
                other => log::debug!("skipping tar record {:?} of type {:?}", name, other as char),
            }

            pos = start + size.div_ceil(TAR_BLOCK) * TAR_BLOCK;
        }
        Ok(tree)
    }
}

impl Archive for TarArchive {
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
