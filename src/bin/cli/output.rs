//! Output formatting for CLI operations.

use serde_json::json;
use std::path::PathBuf;

use arcmgr::FormatId;

/// One archive as listed by the `list` command.
pub struct ArchiveListing {
    pub name: String,
    pub format: FormatId,
    pub parent: Option<String>,
    pub entries: Vec<EntryListing>,
}

/// One node of an archive's entry tree.
pub struct EntryListing {
    pub path: String,
    pub size: usize,
    pub is_dir: bool,
}

/// A resolved resource.
pub struct Match {
    pub archive: String,
    pub path: String,
    pub size: usize,
}

/// Duplicate groups found in one archive.
pub struct CheckReport {
    pub archive: String,
    pub duplicate_names: Vec<Vec<String>>,
    pub duplicate_content: Vec<Vec<String>>,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats format detection results
    fn format_identify(&self, results: &[(PathBuf, Option<FormatId>)]) -> String;

    /// Formats archive listings
    fn format_list(&self, archives: &[ArchiveListing]) -> String;

    /// Formats resolved resources
    fn format_matches(&self, name: &str, matches: &[Match]) -> String;

    /// Formats a maintenance check report
    fn format_check(&self, report: &CheckReport) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_identify(&self, results: &[(PathBuf, Option<FormatId>)]) -> String {
        let mut output = String::new();
        for (path, format) in results {
            let tag = format.map_or("unknown", FormatId::as_str);
            output.push_str(&format!("{:<8} {}\n", tag, path.display()));
        }
        output
    }

    fn format_list(&self, archives: &[ArchiveListing]) -> String {
        let mut output = String::new();

        for archive in archives {
            output.push_str(&format!("{} [{}]\n", archive.name, archive.format));
            if let Some(parent) = &archive.parent {
                output.push_str(&format!("  inside {}\n", parent));
            }
            output.push_str(&format!("{:>12} {}\n", "Size", "Name"));
            output.push_str(&"-".repeat(70));
            output.push('\n');

            let mut total_size: u64 = 0;
            let mut file_count = 0;
            let mut dir_count = 0;

            for entry in &archive.entries {
                let size_str = if entry.is_dir {
                    dir_count += 1;
                    String::new()
                } else {
                    file_count += 1;
                    total_size += entry.size as u64;
                    humanize_bytes(entry.size as u64)
                };
                let type_indicator = if entry.is_dir { "/" } else { "" };
                output.push_str(&format!("{:>12} {}{}\n", size_str, entry.path, type_indicator));
            }

            output.push_str(&"-".repeat(70));
            output.push('\n');
            output.push_str(&format!(
                "{} files, {} directories, {} total\n\n",
                file_count,
                dir_count,
                humanize_bytes(total_size)
            ));
        }

        output
    }

    fn format_matches(&self, name: &str, matches: &[Match]) -> String {
        if matches.is_empty() {
            return format!("{} not found\n", name);
        }
        let mut output = String::new();
        for found in matches {
            output.push_str(&format!(
                "{:>12} {} in {}\n",
                humanize_bytes(found.size as u64),
                found.path,
                found.archive
            ));
        }
        output
    }

    fn format_check(&self, report: &CheckReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("Checked {}\n", report.archive));

        let sections = [
            ("Duplicate names", &report.duplicate_names),
            ("Duplicate content", &report.duplicate_content),
        ];
        for (title, groups) in sections {
            if groups.is_empty() {
                output.push_str(&format!("  {}: none\n", title));
                continue;
            }
            output.push_str(&format!("  {}: {} groups\n", title, groups.len()));
            for group in groups {
                output.push_str(&format!("    {}\n", group.join(", ")));
            }
        }
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_identify(&self, results: &[(PathBuf, Option<FormatId>)]) -> String {
        let items: Vec<_> = results
            .iter()
            .map(|(path, format)| {
                json!({
                    "path": path.display().to_string(),
                    "format": format.map(FormatId::as_str),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_list(&self, archives: &[ArchiveListing]) -> String {
        let items: Vec<_> = archives
            .iter()
            .map(|a| {
                json!({
                    "name": a.name,
                    "format": a.format.as_str(),
                    "parent": a.parent,
                    "entries": a.entries.iter().map(|e| json!({
                        "path": e.path,
                        "size": e.size,
                        "is_directory": e.is_dir,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_matches(&self, name: &str, matches: &[Match]) -> String {
        let obj = json!({
            "name": name,
            "matches": matches.iter().map(|m| json!({
                "archive": m.archive,
                "path": m.path,
                "size": m.size,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_check(&self, report: &CheckReport) -> String {
        let obj = json!({
            "archive": report.archive,
            "duplicate_names": report.duplicate_names,
            "duplicate_content": report.duplicate_content,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
