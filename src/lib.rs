//! # arcmgr
//!
//! Archive registry and resource resolution for game data editors.
//!
//! Doom-engine mods ship as stacks of archives: an IWAD as the base game data,
//! PWADs and PK3s layered on top, often with wads nested inside zips. This
//! crate keeps track of every archive an editor has open, how they nest, and
//! which of them take part when a resource is looked up by name.
//!
//! - [`format`]: sniffing archive formats from their bytes
//! - [`Registry`]: opening, nesting, closing and saving archives
//! - [`Registry::find_first`] / [`Registry::find_all`]: resource resolution
//!   across open archives and the base resource
//! - bookmarks, recent files and a synchronous notification [`Bus`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arcmgr::{Event, Registry, RegistryConfig, Result, SearchOptions};
//!
//! fn main() -> Result<()> {
//!     let config = RegistryConfig::new()
//!         .auto_mount_embedded(true)
//!         .base_resource_paths(["/games/doom2.wad"])
//!         .base_resource(Some(0));
//!     let mut registry = Registry::new(config);
//!     registry.subscribe(|event: &Event| println!("{}", event));
//!     registry.init_base_resource();
//!
//!     // Open a pk3; wads at its root are opened as children
//!     let pk3 = registry.open_path("mymod.pk3", false)?;
//!     println!("{} archives open", registry.len());
//!
//!     // Resolve a lump: open archives override the base resource
//!     if let Some(found) = registry.find_first("PLAYPAL", None) {
//!         println!("PLAYPAL: {}", registry.entry_path(found)?);
//!     }
//!
//!     // Every music lump, base resource first
//!     let music = SearchOptions::new().name("D_*");
//!     for entry in registry.find_all(&music, None) {
//!         println!("{}", entry);
//!     }
//!
//!     // Closing the pk3 closes everything opened from it
//!     registry.close(pk3);
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Tag | Read | Create | Notes |
//! |--------|-----|------|--------|-------|
//! | Doom wad | `wad` | Yes | Yes | IWAD and PWAD; mounted when embedded |
//! | Zip / pk3 | `zip` | Yes | Yes | Mounts embedded wads at its root |
//! | Quake pak | `pak` | Yes | No | |
//! | Build grp | `grp` | Yes | No | |
//! | Quake wad2 | `wad2` | Yes | No | Also wad3 |
//! | Gzip | `gzip` | Yes | No | Single entry; `gzip` feature |
//! | Bzip2 | `bzip2` | Yes | No | Single entry; `bzip2` feature |
//! | Tar | `tar` | Yes | No | ustar and GNU long names |
//! | Directory | `folder` | Yes | No | Opened from a directory path |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `gzip` | Yes | Gzip decoding with flate2 |
//! | `bzip2` | Yes | Bzip2 decoding |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Operations that refuse a
//! request without anything going wrong (closing an unknown handle, adding a
//! duplicate bookmark) return `bool` instead. Soft conditions that do not
//! fail an open, such as [`Error::OrphanedNesting`], are collected and can be
//! drained with [`Registry::take_warnings`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod archive;
pub mod base;
pub mod bookmarks;
pub mod bus;
pub mod check;
pub mod config;
pub mod entry_path;
pub mod error;
pub mod event;
pub mod format;
pub mod fs;
pub mod pool;
pub mod recent;
pub mod registry;
pub mod search;
pub mod tree;

pub use archive::{Archive, ArchiveCore, ArchiveEvent, ArchiveId, EntryRef, Source};
pub use base::BaseResources;
pub use bookmarks::Bookmarks;
pub use bus::{Bus, Inbox, SubscriberId};
pub use config::RegistryConfig;
pub use entry_path::EntryPath;
pub use error::{Error, Result};
pub use event::Event;
pub use format::{FormatDesc, FormatId};
pub use pool::{NoPool, ResourcePool};
pub use recent::RecentFiles;
pub use registry::{Lookup, Registry};
pub use search::SearchOptions;
pub use tree::{EntryId, EntryTree, Node, NodeKind};
