//! Image file synchronizer
//!
//! Recursive image discovery plus added/removed detection between two
//! successive scans.
//!
//! Files are compared by **file name only**, not by their path below the
//! root, so identifiers survive moving a file between subdirectories. Two
//! files with the same name in different directories collapse into one
//! entry: the first one walked is kept and the others are logged.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Directory scanner holding the last two scan snapshots
#[derive(Debug, Clone)]
pub struct FileSynchronizer {
    extension: String,
    ignore_patterns: Vec<String>,
    current: HashSet<String>,
    previous: HashSet<String>,
    locations: HashMap<String, PathBuf>,
}

impl FileSynchronizer {
    /// Scanner for `.png` files with default ignore patterns
    ///
    /// Ignores system entries like .DS_Store, Thumbs.db, .git, etc.
    pub fn new() -> Self {
        Self::with_extension("png")
    }

    /// Scanner for files with the given extension (case-insensitive)
    pub fn with_extension(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_lowercase(),
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
                ".thumbnails".to_string(),
            ],
            current: HashSet::new(),
            previous: HashSet::new(),
            locations: HashMap::new(),
        }
    }

    /// Lowercase extension this scanner matches
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Walk `root` and replace the current snapshot
    ///
    /// The outgoing snapshot becomes the previous one. On error both
    /// snapshots are left untouched.
    pub fn rescan(&mut self, root: &Path) -> Result<(), ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut found = HashSet::new();
        let mut locations = HashMap::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_ignored(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_image_file(entry.path()) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();

            if found.insert(name.clone()) {
                locations.insert(name, relative);
            } else {
                let kept = locations
                    .get(&name)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                tracing::warn!(
                    file = %relative.display(),
                    kept = %kept,
                    "Duplicate file name, keeping first location"
                );
            }
        }

        tracing::debug!(
            root = %root.display(),
            files = found.len(),
            "Scan complete"
        );

        self.previous = std::mem::replace(&mut self.current, found);
        self.locations = locations;
        Ok(())
    }

    /// File names present now but not in the previous scan, sorted
    pub fn added(&self) -> Vec<String> {
        let mut added: Vec<String> = self.current.difference(&self.previous).cloned().collect();
        added.sort();
        added
    }

    /// File names present in the previous scan but not now, sorted
    pub fn removed(&self) -> Vec<String> {
        let mut removed: Vec<String> = self.previous.difference(&self.current).cloned().collect();
        removed.sort();
        removed
    }

    /// Root-relative location where `name` was found by the last scan
    pub fn location(&self, name: &str) -> Option<&Path> {
        self.locations.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.current.contains(name)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.current.iter().map(String::as_str)
    }

    /// Number of files in the current snapshot
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();
        self.ignore_patterns
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
    }

    fn is_image_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase() == self.extension)
            .unwrap_or(false)
    }
}

impl Default for FileSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_extension_detection_is_case_insensitive() {
        let scanner = FileSynchronizer::new();
        assert!(scanner.is_image_file(Path::new("a.png")));
        assert!(scanner.is_image_file(Path::new("a.PNG")));
        assert!(scanner.is_image_file(Path::new("dir/a.Png")));
        assert!(!scanner.is_image_file(Path::new("a.jpg")));
        assert!(!scanner.is_image_file(Path::new("png")));
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let mut scanner = FileSynchronizer::new();
        match scanner.rescan(Path::new("/nonexistent/path")) {
            Err(ScanError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_file_as_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");

        let mut scanner = FileSynchronizer::new();
        match scanner.rescan(&dir.path().join("a.png")) {
            Err(ScanError::NotADirectory(_)) => {}
            other => panic!("Expected NotADirectory error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();
        assert!(scanner.is_empty());
        assert!(scanner.added().is_empty());
        assert!(scanner.removed().is_empty());
    }

    #[test]
    fn test_first_scan_reports_everything_added() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "nested/deeper/B.PNG");
        touch(dir.path(), "notes.txt");

        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();

        assert_eq!(scanner.added(), vec!["B.PNG".to_string(), "a.png".to_string()]);
        assert!(scanner.removed().is_empty());
        assert_eq!(scanner.location("B.PNG"), Some(Path::new("nested/deeper/B.PNG")));
    }

    #[test]
    fn test_rescan_without_changes_yields_empty_diffs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");

        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();
        scanner.rescan(dir.path()).unwrap();
        assert!(scanner.added().is_empty());
        assert!(scanner.removed().is_empty());

        scanner.rescan(dir.path()).unwrap();
        assert!(scanner.added().is_empty());
        assert!(scanner.removed().is_empty());
    }

    #[test]
    fn test_diffs_repeat_until_next_rescan() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");

        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();
        touch(dir.path(), "b.png");
        fs::remove_file(dir.path().join("a.png")).unwrap();
        scanner.rescan(dir.path()).unwrap();

        for _ in 0..2 {
            assert_eq!(scanner.added(), vec!["b.png".to_string()]);
            assert_eq!(scanner.removed(), vec!["a.png".to_string()]);
        }
    }

    #[test]
    fn test_move_between_directories_is_not_a_change() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "one/a.png");

        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();
        fs::create_dir_all(dir.path().join("two")).unwrap();
        fs::rename(dir.path().join("one/a.png"), dir.path().join("two/a.png")).unwrap();
        scanner.rescan(dir.path()).unwrap();

        assert!(scanner.added().is_empty());
        assert!(scanner.removed().is_empty());
        assert_eq!(scanner.location("a.png"), Some(Path::new("two/a.png")));
    }

    #[test]
    fn test_same_name_in_two_directories_collapses() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "x/a.png");
        touch(dir.path(), "y/a.png");

        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();
        assert_eq!(scanner.len(), 1);
        assert_eq!(scanner.added(), vec!["a.png".to_string()]);
    }

    #[test]
    fn test_ignored_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".git/objects/a.png");
        touch(dir.path(), "b.png");

        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();
        assert!(!scanner.contains("a.png"));
        assert!(scanner.contains("b.png"));
    }

    #[test]
    fn test_failed_rescan_keeps_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");

        let mut scanner = FileSynchronizer::new();
        scanner.rescan(dir.path()).unwrap();
        assert!(scanner.rescan(&dir.path().join("missing")).is_err());

        assert!(scanner.contains("a.png"));
        assert_eq!(scanner.added(), vec!["a.png".to_string()]);
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.webp");
        touch(dir.path(), "b.png");

        let mut scanner = FileSynchronizer::with_extension(".WEBP");
        scanner.rescan(dir.path()).unwrap();
        assert_eq!(scanner.extension(), "webp");
        assert_eq!(scanner.added(), vec!["a.webp".to_string()]);
    }
}
