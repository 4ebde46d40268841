//! Container format table and format sniffing.
//!
//! Every supported container is described by one [`FormatDesc`] row in a
//! static table. The rows are kept in detection priority order: formats with
//! strict structural checks come before formats whose magic is weak, so a
//! looser detector never claims a file a stricter one would have recognized.
//!
//! | Tag | Name | Detected by |
//! |-----|------|-------------|
//! | `wad` | Doom Wad Archive | `IWAD`/`PWAD` magic, directory bounds |
//! | `zip` | Zip Archive | `PK\x03\x04` / `PK\x05\x06` |
//! | `pak` | Quake Pak | `PACK` magic, 64-byte directory entries |
//! | `grp` | Build Grp | `KenSilverman` magic, 16-byte directory entries |
//! | `wad2` | Quake Wad2 | `WAD2`/`WAD3` magic, 32-byte directory entries |
//! | `gzip` | GZip File | `1F 8B 08` |
//! | `bzip2` | BZip2 File | `BZh` and a block size digit |
//! | `tar` | Tar Archive | `ustar` magic or a valid header checksum |
//! | `folder` | Directory | never sniffed; any directory path |
//!
//! # Example
//!
//! ```rust
//! use arcmgr::format::{self, FormatId};
//!
//! let mut wad = b"PWAD".to_vec();
//! wad.extend_from_slice(&0i32.to_le_bytes());
//! wad.extend_from_slice(&12i32.to_le_bytes());
//!
//! assert_eq!(format::identify_bytes(&wad), Some(FormatId::Wad));
//! assert_eq!(format::identify_bytes(b"plain text"), None);
//! ```

pub mod detect;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::archive::formats::{
    Bzip2Archive, FolderArchive, GrpArchive, GzipArchive, PakArchive, TarArchive, Wad2Archive,
    WadArchive, ZipArchive,
};
use crate::archive::{Archive, Source};

pub use detect::Probe;

/// Known archive magic numbers.
pub mod magic {
    /// Doom IWAD.
    pub const IWAD: &[u8; 4] = b"IWAD";
    /// Doom PWAD.
    pub const PWAD: &[u8; 4] = b"PWAD";
    /// Zip local file header.
    pub const ZIP_LOCAL: &[u8; 4] = b"PK\x03\x04";
    /// Zip end of central directory (empty archive).
    pub const ZIP_EMPTY: &[u8; 4] = b"PK\x05\x06";
    /// Quake PAK.
    pub const PACK: &[u8; 4] = b"PACK";
    /// Build engine GRP.
    pub const KEN_SILVERMAN: &[u8; 12] = b"KenSilverman";
    /// Quake WAD2.
    pub const WAD2: &[u8; 4] = b"WAD2";
    /// Half-Life WAD3.
    pub const WAD3: &[u8; 4] = b"WAD3";
    /// gzip member header with the deflate method byte.
    pub const GZIP: &[u8; 3] = &[0x1F, 0x8B, 0x08];
    /// bzip2 stream header (followed by a block size digit).
    pub const BZIP2: &[u8; 3] = b"BZh";
    /// POSIX tar magic at offset 257.
    pub const USTAR: &[u8; 5] = b"ustar";
}

/// Identifier of a container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatId {
    /// Doom WAD.
    Wad,
    /// Zip / PK3.
    Zip,
    /// Quake PAK.
    Pak,
    /// Build engine GRP.
    Grp,
    /// Quake WAD2 / Half-Life WAD3.
    Wad2,
    /// Single gzip-compressed file.
    Gzip,
    /// Single bzip2-compressed file.
    Bzip2,
    /// POSIX / GNU tar.
    Tar,
    /// A directory on disk.
    Folder,
}

impl FormatId {
    /// Returns the format's string tag, e.g. `"wad"`.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatId::Wad => "wad",
            FormatId::Zip => "zip",
            FormatId::Pak => "pak",
            FormatId::Grp => "grp",
            FormatId::Wad2 => "wad2",
            FormatId::Gzip => "gzip",
            FormatId::Bzip2 => "bzip2",
            FormatId::Tar => "tar",
            FormatId::Folder => "folder",
        }
    }

    /// Parses a string tag (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        FORMATS
            .iter()
            .map(|desc| desc.id)
            .find(|id| id.as_str().eq_ignore_ascii_case(tag))
    }

    /// Returns the table row for this format.
    pub fn desc(self) -> &'static FormatDesc {
        format(self)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the format table.
pub struct FormatDesc {
    /// Format identifier.
    pub id: FormatId,
    /// Human-readable name.
    pub name: &'static str,
    /// File extensions with a description of each.
    pub extensions: &'static [(&'static str, &'static str)],
    /// Structural detector; `None` for formats that are never sniffed.
    pub detect: Option<fn(&mut dyn Probe) -> bool>,
    /// Constructs an empty, unloaded archive of this format.
    pub create: fn() -> Box<dyn Archive>,
    /// Whether a new empty archive may be created and saved.
    pub creatable: bool,
    /// Whether archives of this format are mounted when found inside another.
    pub embeddable: bool,
    /// Whether root-level entries are probed for embedded archives.
    pub root_mounts: bool,
}

impl fmt::Debug for FormatDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDesc")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("creatable", &self.creatable)
            .field("embeddable", &self.embeddable)
            .field("root_mounts", &self.root_mounts)
            .finish_non_exhaustive()
    }
}

fn create<A: Archive + Default + 'static>() -> Box<dyn Archive> {
    Box::new(A::default())
}

/// The format table, in detection priority order.
///
/// Row order matches the declaration order of [`FormatId`].
static FORMATS: [FormatDesc; 9] = [
    FormatDesc {
        id: FormatId::Wad,
        name: "Doom Wad Archive",
        extensions: &[("wad", "Doom Wad")],
        detect: Some(detect::is_wad),
        create: create::<WadArchive>,
        creatable: true,
        embeddable: true,
        root_mounts: false,
    },
    FormatDesc {
        id: FormatId::Zip,
        name: "Zip Archive",
        extensions: &[("zip", "Zip"), ("pk3", "Pk3")],
        detect: Some(detect::is_zip),
        create: create::<ZipArchive>,
        creatable: true,
        embeddable: false,
        root_mounts: true,
    },
    FormatDesc {
        id: FormatId::Pak,
        name: "Quake Pak",
        extensions: &[("pak", "Quake Pak")],
        detect: Some(detect::is_pak),
        create: create::<PakArchive>,
        creatable: false,
        embeddable: false,
        root_mounts: false,
    },
    FormatDesc {
        id: FormatId::Grp,
        name: "Build Grp",
        extensions: &[("grp", "Build Grp")],
        detect: Some(detect::is_grp),
        create: create::<GrpArchive>,
        creatable: false,
        embeddable: false,
        root_mounts: false,
    },
    FormatDesc {
        id: FormatId::Wad2,
        name: "Quake Wad2",
        extensions: &[("wad", "Quake Wad2")],
        detect: Some(detect::is_wad2),
        create: create::<Wad2Archive>,
        creatable: false,
        embeddable: false,
        root_mounts: false,
    },
    FormatDesc {
        id: FormatId::Gzip,
        name: "GZip File",
        extensions: &[("gz", "GZip")],
        detect: Some(detect::is_gzip),
        create: create::<GzipArchive>,
        creatable: false,
        embeddable: false,
        root_mounts: false,
    },
    FormatDesc {
        id: FormatId::Bzip2,
        name: "BZip2 File",
        extensions: &[("bz2", "BZip2")],
        detect: Some(detect::is_bzip2),
        create: create::<Bzip2Archive>,
        creatable: false,
        embeddable: false,
        root_mounts: false,
    },
    FormatDesc {
        id: FormatId::Tar,
        name: "Tar Archive",
        extensions: &[("tar", "Tar")],
        detect: Some(detect::is_tar),
        create: create::<TarArchive>,
        creatable: false,
        embeddable: false,
        root_mounts: false,
    },
    FormatDesc {
        id: FormatId::Folder,
        name: "Directory",
        extensions: &[],
        detect: None,
        create: create::<FolderArchive>,
        creatable: false,
        embeddable: false,
        root_mounts: true,
    },
];

/// Returns every format row in detection priority order.
pub fn formats() -> &'static [FormatDesc] {
    &FORMATS
}

/// Returns the row for `id`.
pub fn format(id: FormatId) -> &'static FormatDesc {
    &FORMATS[id as usize]
}

fn identify_probe(probe: &mut dyn Probe, allowed: Option<&[FormatId]>) -> Option<FormatId> {
    FORMATS
        .iter()
        .filter(|desc| allowed.is_none_or(|allowed| allowed.contains(&desc.id)))
        .find(|desc| desc.detect.is_some_and(|detect| detect(probe)))
        .map(|desc| desc.id)
}

fn identify_source(source: &Source<'_>, allowed: Option<&[FormatId]>) -> Option<FormatId> {
    let found = match *source {
        Source::Path(path) => {
            if path.is_dir() {
                return allowed
                    .is_none_or(|allowed| allowed.contains(&FormatId::Folder))
                    .then_some(FormatId::Folder);
            }
            match File::open(path) {
                Ok(file) => identify_probe(&mut BufReader::new(file), allowed),
                Err(e) => {
                    log::debug!("cannot probe {}: {}", path.display(), e);
                    None
                }
            }
        }
        Source::Entry { data, .. } => identify_probe(&mut Cursor::new(data), allowed),
    };
    log::debug!(
        "sniffed {} as {}",
        source.describe(),
        found.map_or("unrecognized", FormatId::as_str)
    );
    found
}

/// Identifies the format of a byte source.
///
/// Returns `None` when no registered detector recognizes it. A directory
/// path is reported as [`FormatId::Folder`].
pub fn identify(source: &Source<'_>) -> Option<FormatId> {
    identify_source(source, None)
}

/// Identifies the format of a byte source, trying only the `allowed` formats.
pub fn identify_restricted(source: &Source<'_>, allowed: &[FormatId]) -> Option<FormatId> {
    identify_source(source, Some(allowed))
}

/// Identifies the format of an in-memory buffer.
pub fn identify_bytes(data: &[u8]) -> Option<FormatId> {
    identify_probe(&mut Cursor::new(data), None)
}

/// Identifies the format of a file (or directory) on disk.
pub fn identify_path(path: impl AsRef<Path>) -> Option<FormatId> {
    identify(&Source::Path(path.as_ref()))
}

/// Returns the formats a new, empty archive can be created in.
pub fn creatable_formats() -> impl Iterator<Item = &'static FormatDesc> {
    FORMATS.iter().filter(|desc| desc.creatable)
}

/// Builds a file dialog filter string covering every extension.
///
/// The first section, `Any supported file`, lists every extension once; it
/// is followed by one section per (extension, description) pair. Each
/// extension appears in lower, upper and capitalized form.
pub fn file_dialog_filter() -> String {
    fn variants(ext: &str) -> String {
        let mut capitalized = ext.to_ascii_lowercase();
        if let Some(first) = capitalized.get_mut(..1) {
            first.make_ascii_uppercase();
        }
        format!(
            "*.{};*.{};*.{}",
            ext.to_ascii_lowercase(),
            ext.to_ascii_uppercase(),
            capitalized
        )
    }

    let mut all = Vec::new();
    let mut sections = Vec::new();
    for desc in formats() {
        for (ext, description) in desc.extensions {
            let pattern = variants(ext);
            if !all.contains(&pattern) {
                all.push(pattern.clone());
            }
            sections.push(format!("{} files (*.{})|{}", description, ext, pattern));
        }
    }

    let mut filter = format!("Any supported file|{}", all.join(";"));
    for section in sections {
        filter.push('|');
        filter.push_str(&section);
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_ids() {
        for (index, desc) in formats().iter().enumerate() {
            assert_eq!(desc.id as usize, index);
            assert_eq!(format(desc.id).id, desc.id);
        }
    }

    #[test]
    fn test_tags_round_trip() {
        for desc in formats() {
            assert_eq!(FormatId::from_tag(desc.id.as_str()), Some(desc.id));
        }
        assert_eq!(FormatId::from_tag("WAD"), Some(FormatId::Wad));
        assert_eq!(FormatId::from_tag("rar"), None);
    }

    #[test]
    fn test_only_wad_is_embeddable() {
        let embeddable: Vec<_> = formats()
            .iter()
            .filter(|d| d.embeddable)
            .map(|d| d.id)
            .collect();
        assert_eq!(embeddable, vec![FormatId::Wad]);
    }

    #[test]
    fn test_creatable_formats() {
        let ids: Vec<_> = creatable_formats().map(|d| d.id).collect();
        assert_eq!(ids, vec![FormatId::Wad, FormatId::Zip]);
    }

    #[test]
    fn test_create_produces_matching_format() {
        for desc in formats() {
            assert_eq!((desc.create)().format_id(), desc.id);
        }
    }

    #[test]
    fn test_file_dialog_filter() {
        let filter = file_dialog_filter();
        assert!(filter.starts_with("Any supported file|*.wad;*.WAD;*.Wad;*.zip;"));
        assert!(filter.contains("|Pk3 files (*.pk3)|*.pk3;*.PK3;*.Pk3"));
        assert!(filter.contains("|Quake Wad2 files (*.wad)|*.wad;*.WAD;*.Wad"));
        assert_eq!(filter.matches("Any supported").count(), 1);
        assert_eq!(filter.split('|').nth(1).unwrap().matches("*.wad;").count(), 1);
    }

    #[test]
    fn test_restricted_identify() {
        let data = [0x1F, 0x8B, 0x08, 0x00];
        let source = Source::Entry {
            parent: crate::EntryRef::new(crate::ArchiveId::next(), crate::EntryId::from_raw(1)),
            name: "x.gz",
            data: &data,
        };
        assert_eq!(identify(&source), Some(FormatId::Gzip));
        assert_eq!(
            identify_restricted(&source, &[FormatId::Wad, FormatId::Zip]),
            None
        );
    }

    #[test]
    fn test_directory_identifies_as_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(identify_path(dir.path()), Some(FormatId::Folder));
        assert_eq!(
            identify_restricted(&Source::Path(dir.path()), &[FormatId::Wad]),
            None
        );
    }
}
