//! Notifications published by the [`Registry`](crate::Registry).

use std::fmt;

/// A registry notification.
///
/// Archive events carry the registry index of the archive at the time the
/// event was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Event {
    /// A new archive record was inserted.
    ArchiveAdded,
    /// An archive was opened (or an already open archive was re-requested).
    ArchiveOpened {
        /// Registry index of the archive.
        index: usize,
    },
    /// An archive is about to close.
    ArchiveClosing {
        /// Registry index of the archive.
        index: usize,
    },
    /// An archive was closed and its record removed.
    ArchiveClosed {
        /// Registry index the archive had when it was removed.
        index: usize,
    },
    /// An archive was saved.
    ArchiveSaved {
        /// Registry index of the archive.
        index: usize,
    },
    /// An archive's contents changed.
    ArchiveModified {
        /// Registry index of the archive.
        index: usize,
    },
    /// A path was appended to the base resource list.
    BaseResourcePathAdded,
    /// A path was removed from the base resource list.
    BaseResourcePathRemoved,
    /// The loaded base resource archive changed (or failed to load).
    BaseResourceChanged,
    /// The bookmark set changed.
    BookmarksChanged,
    /// The recent file list changed.
    RecentFilesChanged,
}

impl Event {
    /// Returns the event's tag, e.g. `"archive_opened"`.
    pub fn name(&self) -> &'static str {
        match self {
            Event::ArchiveAdded => "archive_added",
            Event::ArchiveOpened { .. } => "archive_opened",
            Event::ArchiveClosing { .. } => "archive_closing",
            Event::ArchiveClosed { .. } => "archive_closed",
            Event::ArchiveSaved { .. } => "archive_saved",
            Event::ArchiveModified { .. } => "archive_modified",
            Event::BaseResourcePathAdded => "base_resource_path_added",
            Event::BaseResourcePathRemoved => "base_resource_path_removed",
            Event::BaseResourceChanged => "base_resource_changed",
            Event::BookmarksChanged => "bookmarks_changed",
            Event::RecentFilesChanged => "recent_files_changed",
        }
    }

    /// Returns the archive index payload, if the event has one.
    pub fn index(&self) -> Option<usize> {
        match *self {
            Event::ArchiveOpened { index }
            | Event::ArchiveClosing { index }
            | Event::ArchiveClosed { index }
            | Event::ArchiveSaved { index }
            | Event::ArchiveModified { index } => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "{}({})", self.name(), index),
            None => f.write_str(self.name()),
        }
    }
}
