//! Error types for archive registry operations.
//!
//! This module provides the [`Error`] enum which represents all failure modes
//! of opening, closing and resolving archives, along with a convenient
//! [`Result<T>`] type alias.
//!
//! No error in this crate is fatal to the process. Every fallible operation
//! detects its failure before touching registry state, so an `Err` (or a
//! `false` from the boolean-returning operations) always leaves the registry
//! exactly as it was.
//!
//! # Error Categories
//!
//! | Category | Variants | Typical Cause |
//! |----------|----------|---------------|
//! | I/O | [`Io`][Error::Io] | File system operations |
//! | Format | [`UnsupportedFormat`][Error::UnsupportedFormat], [`LoadFailure`][Error::LoadFailure] | Unknown or damaged container |
//! | Capability | [`CannotCreate`][Error::CannotCreate], [`UnsupportedOperation`][Error::UnsupportedOperation] | Format lacks a writer |
//! | Lookup | [`InvalidHandle`][Error::InvalidHandle], [`InvalidIndex`][Error::InvalidIndex], [`EntryNotFound`][Error::EntryNotFound] | Stale handle or position |
//! | Soft | [`OrphanedNesting`][Error::OrphanedNesting] | Recorded, never returned from a successful open |
//!
//! ```rust,no_run
//! use arcmgr::{Error, Registry, RegistryConfig};
//!
//! let mut registry = Registry::new(RegistryConfig::default());
//! match registry.open_path("doom2.wad", false) {
//!     Ok(id) => println!("opened as {}", id),
//!     Err(Error::UnsupportedFormat { origin }) => eprintln!("not an archive: {}", origin),
//!     Err(e @ Error::LoadFailure { .. }) => eprintln!("damaged archive: {}", e),
//!     Err(e) => eprintln!("error: {}", e),
//! }
//! ```

use std::io;

use crate::archive::{ArchiveId, EntryRef};

/// The main error type for archive registry operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No registered format recognized the byte source.
    ///
    /// The string names the source (a path, or the entry the bytes came from).
    #[error("Unsupported or invalid archive format: {origin}")]
    UnsupportedFormat {
        /// Description of the rejected source.
        origin: String,
    },

    /// The format was recognized but its parser rejected the bytes.
    ///
    /// The instantiated archive is discarded and the registry is untouched.
    #[error("Failed to load {format} archive: {reason}")]
    LoadFailure {
        /// Format tag of the archive that failed to load.
        format: &'static str,
        /// The underlying parser's message.
        reason: String,
    },

    /// A new, empty archive cannot be created in this format.
    #[error("Can not create archive of format: {format}")]
    CannotCreate {
        /// The requested format tag.
        format: String,
    },

    /// The archive implementation does not support the requested operation.
    #[error("{format} archives do not support {operation}")]
    UnsupportedOperation {
        /// Format tag of the archive.
        format: &'static str,
        /// Name of the operation.
        operation: &'static str,
    },

    /// The archive handle is not tracked by the registry.
    #[error("Archive {0} is not open")]
    InvalidHandle(ArchiveId),

    /// A list position is out of range.
    #[error("Index {index} out of range (length {len})")]
    InvalidIndex {
        /// The requested position.
        index: usize,
        /// The list length at the time of the request.
        len: usize,
    },

    /// No entry exists at the given path or reference.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// Path or description of the missing entry.
        path: String,
    },

    /// An entry path failed validation.
    #[error("Invalid entry path: {0}")]
    InvalidEntryPath(String),

    /// A child archive was opened from an entry whose archive is not tracked.
    ///
    /// This is a soft condition: the child is opened and tracked without a
    /// parent edge, and the condition is recorded in
    /// [`Registry::take_warnings`](crate::Registry::take_warnings).
    #[error("Archive opened from entry {entry} of an untracked archive")]
    OrphanedNesting {
        /// The entry the child was opened from.
        entry: EntryRef,
    },
}

impl Error {
    /// Returns `true` if this error concerns the format of a byte source.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat { .. } | Error::LoadFailure { .. }
        )
    }

    /// Returns `true` for conditions that are recorded rather than returned.
    pub fn is_soft(&self) -> bool {
        matches!(self, Error::OrphanedNesting { .. })
    }

    /// Returns `true` if retrying the operation could succeed.
    ///
    /// Stale handles and indices are recoverable: the caller can refresh its
    /// view of the registry and try again. Format errors are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidHandle(_) | Error::InvalidIndex { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Creates a LoadFailure error.
    pub fn load_failure(format: &'static str, reason: impl Into<String>) -> Self {
        Error::LoadFailure {
            format,
            reason: reason.into(),
        }
    }

    /// Creates an UnsupportedFormat error.
    pub fn unsupported_format(origin: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            origin: origin.into(),
        }
    }
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;
