//! Configuration consumed by the archive registry.
//!
//! This module provides [`RegistryConfig`], read once when a
//! [`Registry`](crate::Registry) is constructed. How the values are persisted
//! between sessions is up to the embedding application.

use std::path::PathBuf;

/// Default length bound of the recent file list.
pub const DEFAULT_MAX_RECENT_FILES: usize = 25;

/// Registry configuration.
///
/// # Example
///
/// ```rust
/// use arcmgr::RegistryConfig;
///
/// // Defaults: 25 recent files, no auto-mounting, no base resource
/// let config = RegistryConfig::default();
/// assert_eq!(config.max_recent_files, 25);
///
/// let config = RegistryConfig::new()
///     .max_recent_files(10)
///     .auto_mount_embedded(true)
///     .base_resource_paths(["/games/doom2.wad", "/games/freedoom2.wad"])
///     .base_resource(Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of entries in the recent file list.
    ///
    /// Default: 25.
    pub max_recent_files: usize,

    /// Open embedded archives found at the root of zip and directory
    /// archives as children.
    ///
    /// Default: false.
    pub auto_mount_embedded: bool,

    /// Index into `base_resource_paths` of the base resource to load on
    /// [`Registry::init_base_resource`](crate::Registry::init_base_resource).
    ///
    /// Default: `None` (no base resource).
    pub base_resource: Option<usize>,

    /// Candidate base resource files, in user order.
    ///
    /// Default: empty.
    pub base_resource_paths: Vec<PathBuf>,

    /// Recent files restored at startup, most recent first.
    ///
    /// Default: empty.
    pub recent_files: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_recent_files: DEFAULT_MAX_RECENT_FILES,
            auto_mount_embedded: false,
            base_resource: None,
            base_resource_paths: Vec::new(),
            recent_files: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recent file list bound.
    pub fn max_recent_files(mut self, max: usize) -> Self {
        self.max_recent_files = max;
        self
    }

    /// Sets whether embedded archives are mounted automatically.
    pub fn auto_mount_embedded(mut self, enabled: bool) -> Self {
        self.auto_mount_embedded = enabled;
        self
    }

    /// Sets the base resource index to load at startup.
    pub fn base_resource(mut self, index: Option<usize>) -> Self {
        self.base_resource = index;
        self
    }

    /// Sets the candidate base resource files.
    pub fn base_resource_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.base_resource_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the recent files restored at startup.
    pub fn recent_files<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recent_files = paths.into_iter().map(Into::into).collect();
        self
    }
}
