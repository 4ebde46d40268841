//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};

use arcmgr::check::{duplicate_entry_content, duplicate_entry_names};
use arcmgr::format::identify_path;
use arcmgr::{Archive, ArchiveId, EntryId, EntryRef, Error, Registry, RegistryConfig, SearchOptions};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{ArchiveListing, CheckReport, EntryListing, Match, create_formatter};

/// Configuration for the find command.
pub struct FindConfig<'a> {
    pub name: &'a str,
    pub archives: &'a [PathBuf],
    pub base: Option<&'a Path>,
    pub all: bool,
    pub format: OutputFormat,
}

/// Identify command implementation
pub fn identify(files: &[PathBuf], format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let results: Vec<_> = files
        .iter()
        .map(|path| (path.clone(), identify_path(path)))
        .collect();

    print!("{}", formatter.format_identify(&results));

    if results.iter().any(|(_, format)| format.is_none()) {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

/// List command implementation
pub fn list(archive_path: &Path, nested: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let mut registry = new_registry(nested);

    let root = match open_archive(&mut registry, archive_path) {
        Ok(id) => id,
        Err(code) => return code,
    };
    report_warnings(&mut registry);

    let mut ids = vec![root];
    ids.extend(registry.dependents_of(root).unwrap_or_default());

    let listings: Vec<ArchiveListing> = ids
        .into_iter()
        .filter_map(|id| {
            let archive = registry.archive(id)?;
            Some(ArchiveListing {
                name: archive.filename().to_string(),
                format: archive.format_id(),
                parent: registry
                    .parent_of(id)
                    .and_then(|parent| registry.archive(parent))
                    .map(|parent| parent.filename().to_string()),
                entries: list_entries(archive),
            })
        })
        .collect();

    print!("{}", formatter.format_list(&listings));
    ExitCode::Success
}

/// Find command implementation
pub fn find(config: &FindConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);
    let mut registry = new_registry(true);

    if let Some(base) = config.base {
        if !registry.add_base_resource_path(base) || !registry.open_base_resource(Some(0)) {
            eprintln!("Error: cannot load base resource {}", base.display());
            return ExitCode::BadArchive;
        }
    }
    for path in config.archives {
        if let Err(code) = open_archive(&mut registry, path) {
            return code;
        }
    }
    report_warnings(&mut registry);

    let found: Vec<EntryRef> = if config.all {
        let options = SearchOptions::new().name(config.name);
        registry.find_all(&options, None)
    } else {
        registry.find_first(config.name, None).into_iter().collect()
    };

    let matches: Vec<Match> = found
        .into_iter()
        .filter_map(|entry| {
            Some(Match {
                archive: archive_name(&registry, entry.archive)?,
                path: registry.entry_path(entry).ok()?,
                size: registry.entry_data(entry).map_or(0, <[u8]>::len),
            })
        })
        .collect();

    print!("{}", formatter.format_matches(config.name, &matches));

    if matches.is_empty() {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

/// Check command implementation
pub fn check(archive_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let mut registry = new_registry(false);

    let id = match open_archive(&mut registry, archive_path) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let Some(archive) = registry.archive(id) else {
        return ExitCode::FatalError;
    };

    let names = |groups: Vec<Vec<EntryId>>| -> Vec<Vec<String>> {
        groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .filter_map(|entry| archive.tree().path_of(entry))
                    .collect()
            })
            .collect()
    };
    let report = CheckReport {
        archive: archive.filename().to_string(),
        duplicate_names: names(duplicate_entry_names(archive)),
        duplicate_content: names(duplicate_entry_content(archive)),
    };

    print!("{}", formatter.format_check(&report));

    if report.duplicate_names.is_empty() && report.duplicate_content.is_empty() {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

fn new_registry(auto_mount: bool) -> Registry {
    Registry::new(
        RegistryConfig::new()
            .auto_mount_embedded(auto_mount)
            .max_recent_files(0),
    )
}

fn open_archive(registry: &mut Registry, path: &Path) -> Result<ArchiveId, ExitCode> {
    registry.open_path(path, true).map_err(|e| {
        eprintln!("Error opening {}: {}", path.display(), e);
        error_to_exit_code(&e)
    })
}

fn report_warnings(registry: &mut Registry) {
    for warning in registry.take_warnings() {
        match warning {
            Error::OrphanedNesting { .. } => log::debug!("{}", warning),
            _ => eprintln!("Warning: {}", warning),
        }
    }
}

fn archive_name(registry: &Registry, id: ArchiveId) -> Option<String> {
    registry
        .archive(id)
        .or_else(|| registry.base_resource_archive().filter(|base| base.id() == id))
        .map(|archive| archive.filename().to_string())
}

fn list_entries(archive: &dyn Archive) -> Vec<EntryListing> {
    let tree = archive.tree();
    tree.walk(tree.root())
        .into_iter()
        .filter(|&id| id != tree.root())
        .filter_map(|id| {
            let node = tree.get(id)?;
            Some(EntryListing {
                path: tree.path_of(id)?,
                size: node.size(),
                is_dir: node.is_dir(),
            })
        })
        .collect()
}
