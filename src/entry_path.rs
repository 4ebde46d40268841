//! Validated paths of entries inside an archive.

use crate::{Error, Result};
use std::fmt;

/// Maximum length for entry paths (in bytes).
const MAX_PATH_LENGTH: usize = 4096;

/// A validated path of an entry within an archive.
///
/// `EntryPath` normalizes separators to forward slashes and drops a single
/// leading `/`, so `"/textures/wall.png"`, `"textures\\wall.png"` and
/// `"textures/wall.png"` name the same entry. After normalization the path
/// must not:
/// - contain NUL bytes
/// - be empty
/// - contain empty segments (no `//` or trailing `/`)
/// - contain `.` or `..` segments
///
/// Comparison is byte-exact; use [`EntryPath::eq_ignore_case`] for the
/// case-insensitive matching archive lookups use.
///
/// # Examples
///
/// ```
/// use arcmgr::EntryPath;
///
/// let path = EntryPath::new("/sprites/TROOA1").unwrap();
/// assert_eq!(path.as_str(), "sprites/TROOA1");
/// assert_eq!(path.file_name(), "TROOA1");
///
/// assert!(EntryPath::new("../secret").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryPath(String);

impl EntryPath {
    /// Creates a new `EntryPath` from a string, normalizing and validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryPath`] if the normalized path is empty,
    /// too long, contains NUL bytes, empty segments, or `.`/`..` segments.
    pub fn new(s: &str) -> Result<Self> {
        let normalized = s.replace('\\', "/");
        let normalized = normalized
            .strip_prefix('/')
            .map(str::to_string)
            .unwrap_or(normalized);
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidEntryPath("contains NUL byte".into()));
        }

        if s.is_empty() {
            return Err(Error::InvalidEntryPath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidEntryPath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        for segment in s.split('/') {
            match segment {
                "" => {
                    return Err(Error::InvalidEntryPath(
                        "empty segment (consecutive or trailing slashes)".into(),
                    ));
                }
                "." | ".." => {
                    return Err(Error::InvalidEntryPath(format!(
                        "'{}' segment not allowed",
                        segment
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// A stand-in for entries whose stored name is not a usable path.
    pub(crate) fn placeholder() -> Self {
        Self("-".to_string())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins this path with another segment.
    pub fn join(&self, other: &str) -> Result<Self> {
        Self::new(&format!("{}/{}", self.0, other))
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the file name without its extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(pos) => &name[..pos],
        }
    }

    /// Returns the file extension, if any.
    ///
    /// A leading dot does not start an extension (`.gitignore` has none).
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let dot_pos = file_name.rfind('.')?;
        if dot_pos == 0 {
            None
        } else {
            Some(&file_name[dot_pos + 1..])
        }
    }

    /// Returns an iterator over the path segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Compares two paths ignoring ASCII case.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        let other = other.strip_prefix('/').unwrap_or(other);
        self.0.len() == other.len()
            && self
                .0
                .bytes()
                .zip(other.bytes())
                .all(|(a, b)| a.eq_ignore_ascii_case(&b) || (a == b'/' && b == b'\\'))
    }
}

impl AsRef<str> for EntryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for EntryPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntryPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}
