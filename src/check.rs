//! Archive maintenance checks.
//!
//! These scan one archive's entry tree and report groups of files that are
//! likely mistakes: two files at the same path (which one a lookup finds
//! depends on the search direction), or the same data stored twice.
//! [`entries_unchanged_from`] compares an archive against the base resource
//! instead, finding files copied over from it without changes.
//!
//! # Example
//!
//! ```rust
//! use arcmgr::archive::formats::WadArchive;
//! use arcmgr::{check, Archive};
//!
//! let mut wad = WadArchive::new();
//! wad.add_entry("PLAYPAL", vec![0; 768]).unwrap();
//! wad.add_entry("playpal", vec![1; 768]).unwrap();
//!
//! let groups = check::duplicate_entry_names(&wad);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].len(), 2);
//! ```

use std::collections::HashMap;

use glob::Pattern;

use crate::archive::Archive;
use crate::search::SearchOptions;
use crate::tree::EntryId;

/// Groups files that share a full path, ignoring case.
///
/// Each group lists at least two files in tree order; groups are ordered by
/// their first member.
pub fn duplicate_entry_names(archive: &dyn Archive) -> Vec<Vec<EntryId>> {
    let tree = archive.tree();
    let mut groups: Vec<Vec<EntryId>> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for file in tree.files() {
        let Some(path) = tree.path_of(file) else {
            continue;
        };
        match by_path.get(&path.to_lowercase()) {
            Some(&group) => groups[group].push(file),
            None => {
                by_path.insert(path.to_lowercase(), groups.len());
                groups.push(vec![file]);
            }
        }
    }

    groups.retain(|group| group.len() > 1);
    groups
}

/// Groups files with identical contents.
///
/// Files are bucketed by CRC-32 first and compared byte for byte within a
/// bucket, so colliding checksums never merge different data. Empty files
/// are skipped.
pub fn duplicate_entry_content(archive: &dyn Archive) -> Vec<Vec<EntryId>> {
    let tree = archive.tree();
    let mut buckets: HashMap<(u32, usize), Vec<Vec<EntryId>>> = HashMap::new();
    let mut order: Vec<(u32, usize)> = Vec::new();

    for file in tree.files() {
        let data = tree.data(file).unwrap_or_default();
        if data.is_empty() {
            continue;
        }
        let key = (crc32fast::hash(data), data.len());
        let bucket = buckets.entry(key).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        match bucket
            .iter_mut()
            .find(|group| tree.data(group[0]) == Some(data))
        {
            Some(group) => group.push(file),
            None => bucket.push(vec![file]),
        }
    }

    order
        .into_iter()
        .filter_map(|key| buckets.remove(&key))
        .flatten()
        .filter(|group| group.len() > 1)
        .collect()
}

/// Lists files of `archive` whose counterpart in `base` has the same CRC-32.
///
/// The counterpart is the last file of `base` with the same name in the same
/// namespace. Empty files are skipped, and nothing is reported when both are
/// the same archive.
pub fn entries_unchanged_from(archive: &dyn Archive, base: &dyn Archive) -> Vec<EntryId> {
    if archive.id() == base.id() {
        return Vec::new();
    }
    let tree = archive.tree();
    tree.files()
        .into_iter()
        .filter(|&file| {
            let (Some(node), Some(data)) = (tree.get(file), tree.data(file)) else {
                return false;
            };
            if data.is_empty() {
                return false;
            }
            let mut query = SearchOptions::new().name(Pattern::escape(node.name()));
            if let Some(namespace) = tree.namespace_of(file) {
                query = query.namespace(namespace);
            }
            query
                .find_last(base.tree())
                .and_then(|other| base.tree().data(other))
                .is_some_and(|other| crc32fast::hash(other) == crc32fast::hash(data))
        })
        .collect()
}
