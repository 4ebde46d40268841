//! Container format implementations.
//!
//! Each format parses its byte layout into a fresh [`EntryTree`] and only
//! then installs it into the archive, so a failed load never leaves a half
//! populated archive behind.

mod bzip2;
mod dir;
mod grp;
mod gzip;
mod pak;
mod tar;
mod wad;
mod wad2;
mod zip;

pub use self::bzip2::Bzip2Archive;
pub use self::dir::FolderArchive;
pub use self::grp::GrpArchive;
pub use self::gzip::GzipArchive;
pub use self::pak::PakArchive;
pub use self::tar::TarArchive;
pub use self::wad::WadArchive;
pub use self::wad2::Wad2Archive;
pub use self::zip::ZipArchive;

use crate::archive::{ArchiveCore, Source};
use crate::tree::EntryTree;
use crate::{EntryPath, Result};

/// Binds the source and installs a fully parsed tree.
fn install(core: &mut ArchiveCore, source: &Source<'_>, tree: EntryTree) -> Result<()> {
    core.bind(source)?;
    *core.tree_mut() = tree;
    core.set_modified(false);
    Ok(())
}

fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn le_i32(data: &[u8], at: usize) -> Option<i32> {
    le_u32(data, at).map(|v| v as i32)
}

/// Returns `data[offset..offset + size]` if both values are in range.
fn span(data: &[u8], offset: i64, size: i64) -> Option<&[u8]> {
    if offset < 0 || size < 0 {
        return None;
    }
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(size).ok()?)?;
    data.get(start..end)
}

/// Decodes a NUL-padded fixed-width name field.
fn fixed_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Turns a flat lump name into a single-segment entry path.
///
/// Separator characters are stored as `^` and unusable names become `-`.
fn lump_path(name: &str) -> EntryPath {
    let cleaned = name.replace(['/', '\\'], "^");
    EntryPath::new(&cleaned).unwrap_or_else(|_| EntryPath::placeholder())
}

/// Adds a file found at `name`, skipping names that are not valid paths.
fn add_named(tree: &mut EntryTree, format: &str, name: &str, data: Vec<u8>) {
    match EntryPath::new(name) {
        Ok(path) => {
            tree.add_file(&path, data);
        }
        Err(e) => log::warn!("skipping {} entry {:?}: {}", format, name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(span(&data, 1, 2), Some(&data[1..3]));
        assert_eq!(span(&data, 3, 2), None);
        assert_eq!(span(&data, -1, 1), None);
        assert_eq!(span(&data, 0, -1), None);
        assert_eq!(span(&data, i64::MAX, 1), None);
    }

    #[test]
    fn test_fixed_name() {
        assert_eq!(fixed_name(b"MAP01\0\0\0"), "MAP01");
        assert_eq!(fixed_name(b"ABCDEFGH"), "ABCDEFGH");
    }

    #[test]
    fn test_lump_path_sanitizes() {
        assert_eq!(lump_path("VILE\\1").as_str(), "VILE^1");
        assert_eq!(lump_path("").as_str(), "-");
        assert_eq!(lump_path("..").as_str(), "-");
    }
}
