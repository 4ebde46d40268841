//! Directories on disk treated as archives.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use super::install;
use crate::archive::{Archive, ArchiveCore, Source};
use crate::format::FormatId;
use crate::tree::EntryTree;
use crate::{EntryPath, Error, Result};

/// A directory on disk, loaded recursively.
///
/// Saving writes every directory and file back under the target directory;
/// files removed from the tree are left on disk.
#[derive(Debug)]
pub struct FolderArchive {
    core: ArchiveCore,
}

impl Default for FolderArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderArchive {
    /// Creates an empty, unloaded directory archive.
    pub fn new() -> Self {
        Self {
            core: ArchiveCore::new(FormatId::Folder),
        }
    }

    fn scan(root: &Path) -> Result<EntryTree> {
        if !root.is_dir() {
            return Err(Error::load_failure(
                "folder",
                format!("{} is not a directory", root.display()),
            ));
        }

        let mut tree = EntryTree::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let name = crate::fs::forward_slashes(&relative.to_string_lossy());
            let path = match EntryPath::new(&name) {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("skipping {:?}: {}", entry.path(), e);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                tree.add_dir(&path);
            } else if entry.file_type().is_file() {
                tree.add_file(&path, fs::read(entry.path())?);
            }
        }
        Ok(tree)
    }
}

impl Archive for FolderArchive {
    fn core(&self) -> &ArchiveCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ArchiveCore {
        &mut self.core
    }

    fn load(&mut self, source: Source<'_>) -> Result<()> {
        let Source::Path(root) = source else {
            return Err(Error::load_failure(
                "folder",
                "directories can only be opened from disk",
            ));
        };
        let tree = Self::scan(root)?;
        install(&mut self.core, &source, tree)
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let tree = self.tree();
        fs::create_dir_all(path)?;
        for id in tree.walk(tree.root()) {
            let (Some(node), Some(relative)) = (tree.get(id), tree.path_of(id)) else {
                continue;
            };
            let target = path.join(&relative);
            match node.data() {
                None => fs::create_dir_all(&target)?,
                Some(data) => fs::write(&target, data)?,
            }
        }
        self.core_mut().set_path(path)?;
        self.mark_saved();
        Ok(())
    }
}
