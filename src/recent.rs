//! Bounded most-recently-used file list.

/// Recently opened paths, most recent first.
///
/// The list never holds duplicates and never exceeds its maximum length;
/// inserting into a full list drops the oldest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFiles {
    paths: Vec<String>,
    max: usize,
}

impl RecentFiles {
    /// Creates an empty list bounded to `max` paths.
    pub fn new(max: usize) -> Self {
        Self {
            paths: Vec::new(),
            max,
        }
    }

    /// Moves `path` to the front, inserting it if absent.
    ///
    /// Returns `true` if the list changed.
    pub fn touch(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        match self.paths.iter().position(|p| *p == path) {
            Some(0) => false,
            Some(pos) => {
                let existing = self.paths.remove(pos);
                self.paths.insert(0, existing);
                true
            }
            None if self.max == 0 => false,
            None => {
                self.paths.insert(0, path);
                self.paths.truncate(self.max);
                true
            }
        }
    }

    /// Removes `path`. Returns `false` if it was not listed.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    /// Removes every path.
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Changes the bound, dropping the oldest paths beyond it.
    ///
    /// Returns `true` if any path was dropped.
    pub fn set_max(&mut self, max: usize) -> bool {
        self.max = max;
        let before = self.paths.len();
        self.paths.truncate(max);
        self.paths.len() != before
    }

    /// Returns the bound.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns the path at `index` (0 is the most recent).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.paths.get(index).map(String::as_str)
    }

    /// Returns every path, most recent first.
    pub fn as_slice(&self) -> &[String] {
        &self.paths
    }

    /// Returns the number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_moves_to_front() {
        let mut recent = RecentFiles::new(5);
        recent.touch("a");
        recent.touch("b");
        recent.touch("c");
        assert!(recent.touch("a"));
        assert_eq!(recent.as_slice(), &["a", "c", "b"]);
        assert!(!recent.touch("a"));
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut recent = RecentFiles::new(2);
        recent.touch("a");
        recent.touch("b");
        recent.touch("c");
        assert_eq!(recent.as_slice(), &["c", "b"]);
    }

    #[test]
    fn test_set_max_trims() {
        let mut recent = RecentFiles::new(5);
        for p in ["a", "b", "c"] {
            recent.touch(p);
        }
        assert!(recent.set_max(1));
        assert_eq!(recent.get(0), Some("c"));
        assert!(!recent.set_max(4));
        assert_eq!(recent.max(), 4);
    }

    #[test]
    fn test_remove() {
        let mut recent = RecentFiles::new(5);
        recent.touch("a");
        assert!(recent.remove("a"));
        assert!(!recent.remove("a"));
        assert!(recent.is_empty());
    }
}
