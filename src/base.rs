//! Base resource state: the candidate path list and the loaded archive.
//!
//! The registry drives loading and notifications; this type only keeps the
//! list and the active selection consistent with each other.

use std::path::{Path, PathBuf};

use crate::archive::Archive;

/// Candidate base resource paths and the currently loaded one.
#[derive(Debug, Default)]
pub struct BaseResources {
    paths: Vec<PathBuf>,
    active: Option<(usize, Box<dyn Archive>)>,
}

impl BaseResources {
    /// Creates state holding `paths` with nothing loaded.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            active: None,
        }
    }

    /// Appends a path. Returns `false` for an exact duplicate.
    pub fn push(&mut self, path: PathBuf) -> bool {
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Removes the path at `index`, shifting the active index down when the
    /// removed path preceded it.
    ///
    /// The caller unloads the active archive first if `index` is active.
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        if index >= self.paths.len() {
            return None;
        }
        if let Some((active, _)) = &mut self.active {
            if *active > index {
                *active -= 1;
            }
        }
        Some(self.paths.remove(index))
    }

    /// Returns the path at `index`.
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    /// Returns every candidate path.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Returns the number of candidate paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if there are no candidate paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns the index of the loaded base resource.
    pub fn index(&self) -> Option<usize> {
        self.active.as_ref().map(|(index, _)| *index)
    }

    /// Returns the loaded base archive.
    pub fn archive(&self) -> Option<&dyn Archive> {
        self.active.as_ref().map(|(_, archive)| &**archive)
    }

    /// Records a newly loaded archive, returning the one it replaces.
    pub fn set_active(&mut self, index: usize, archive: Box<dyn Archive>) -> Option<Box<dyn Archive>> {
        self.active.replace((index, archive)).map(|(_, old)| old)
    }

    /// Forgets the loaded archive and returns it.
    pub fn take_active(&mut self) -> Option<Box<dyn Archive>> {
        self.active.take().map(|(_, archive)| archive)
    }
}
