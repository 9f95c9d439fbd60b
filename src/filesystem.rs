//! Filesystem access for tree expansion
//!
//! The overlay engine never touches the disk directly. It goes through the
//! `Filesystem` trait, which answers two questions: does a path exist, and
//! what does the tree below it look like. `DiskFilesystem` answers them with
//! `walkdir`; `MemoryFS` answers them from an in-memory set of paths, which
//! keeps tests and benchmarks independent of the host filesystem.
//!
//! ## Tree order
//!
//! `list_tree` yields the root itself first (with an empty relative subpath),
//! followed by a depth-first pre-order walk in which siblings are visited in
//! byte-lexicographic order of their names. Relative subpaths always use `/`
//! as the separator. This order is observable through the mapping listings,
//! so every implementation must produce it exactly.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// One entry discovered while expanding a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Absolute filesystem path of the entry
    pub path: PathBuf,
    /// Path relative to the expanded root, `/`-separated; empty for the root
    pub relative: String,
}

/// Read-only filesystem operations needed to load mappings.
///
/// This allows the loading logic to run against an in-memory tree in tests.
pub trait Filesystem {
    /// Check whether a file or directory exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Enumerate `root` and all of its descendants in tree order.
    fn list_tree(&self, root: &Path) -> Result<Vec<TreeEntry>>;
}

/// Options for walking the host filesystem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow symbolic links while descending
    pub follow_links: bool,
}

/// The default implementation of `Filesystem`, backed by the host filesystem.
#[derive(Debug, Clone, Default)]
pub struct DiskFilesystem {
    options: WalkOptions,
}

impl DiskFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WalkOptions) -> Self {
        Self { options }
    }
}

impl Filesystem for DiskFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_tree(&self, root: &Path) -> Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(self.options.follow_links)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            let relative = entry.path().strip_prefix(root).map_err(|_| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to make path relative: {}",
                    entry.path().display()
                )))
            })?;

            entries.push(TreeEntry {
                path: entry.path().to_path_buf(),
                relative: to_slash(relative),
            });
        }

        Ok(entries)
    }
}

/// In-memory filesystem made of files and directories.
///
/// Adding a path implicitly creates all of its parent directories, so a tree
/// can be described by listing its files only.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: BTreeSet<PathBuf>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = normalize(path.as_ref())?;
        if self.directories.contains(&path) {
            return Err(Error::Io(std::io::Error::other(format!(
                "A directory already exists at {}",
                path.display()
            ))));
        }
        self.add_parents(&path)?;
        self.files.insert(path);
        Ok(())
    }

    /// Add several files at once
    pub fn add_files<I, P>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.add_file(path)?;
        }
        Ok(())
    }

    /// Add an (optionally empty) directory, creating its parents
    pub fn add_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = normalize(path.as_ref())?;
        if self.files.contains(&path) {
            return Err(Error::Io(std::io::Error::other(format!(
                "A file already exists at {}",
                path.display()
            ))));
        }
        self.add_parents(&path)?;
        self.directories.insert(path);
        Ok(())
    }

    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains(path.as_ref())
    }

    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        self.directories.contains(path.as_ref())
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    fn add_parents(&mut self, path: &Path) -> Result<()> {
        let mut current = path.parent();
        while let Some(parent) = current {
            if parent.as_os_str().is_empty() || self.directories.contains(parent) {
                break;
            }
            if self.files.contains(parent) {
                return Err(Error::Io(std::io::Error::other(format!(
                    "A file already exists at {}",
                    parent.display()
                ))));
            }
            self.directories.insert(parent.to_path_buf());
            current = parent.parent();
        }
        Ok(())
    }
}

impl Filesystem for MemoryFS {
    fn exists(&self, path: &Path) -> bool {
        match normalize(path) {
            Ok(path) => self.files.contains(&path) || self.directories.contains(&path),
            Err(_) => false,
        }
    }

    fn list_tree(&self, root: &Path) -> Result<Vec<TreeEntry>> {
        let root = normalize(root)?;
        if !self.exists(&root) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No such file or directory: {}", root.display()),
            )));
        }

        // BTreeSet<PathBuf> orders component by component, which is the
        // same pre-order walk with sorted siblings that walkdir produces.
        let mut paths: BTreeSet<&PathBuf> = BTreeSet::new();
        paths.extend(self.files.iter().filter(|p| p.starts_with(&root)));
        paths.extend(self.directories.iter().filter(|p| p.starts_with(&root)));

        Ok(paths
            .into_iter()
            .map(|path| TreeEntry {
                relative: to_slash(path.strip_prefix(&root).unwrap_or(Path::new(""))),
                path: path.clone(),
            })
            .collect())
    }
}

/// Render a relative path with `/` separators
fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve `.` and `..` lexically so equal paths compare equal
fn normalize(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Path escapes the filesystem root: {}", path.display()),
                    )));
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> MemoryFS {
        let mut fs = MemoryFS::new();
        fs.add_files([
            "/pkg/resources/css/style.css",
            "/pkg/resources/config/config.yml",
            "/pkg/assets/css/style.css",
        ])
        .unwrap();
        fs
    }

    fn relatives(entries: &[TreeEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.relative.as_str()).collect()
    }

    #[test]
    fn test_memory_fs_creates_parent_directories() {
        let fs = fixture();
        assert!(fs.is_dir("/pkg/resources"));
        assert!(fs.is_dir("/pkg/resources/css"));
        assert!(fs.is_file("/pkg/resources/css/style.css"));
        assert!(fs.exists(Path::new("/pkg")));
        assert!(!fs.exists(Path::new("/pkg/missing")));
        assert_eq!(fs.len(), 3);
    }

    #[test]
    fn test_memory_fs_list_tree_order() {
        let fs = fixture();
        let entries = fs.list_tree(Path::new("/pkg/resources")).unwrap();
        assert_eq!(
            relatives(&entries),
            vec!["", "config", "config/config.yml", "css", "css/style.css"]
        );
        assert_eq!(entries[0].path, PathBuf::from("/pkg/resources"));
        assert_eq!(
            entries[2].path,
            PathBuf::from("/pkg/resources/config/config.yml")
        );
    }

    #[test]
    fn test_memory_fs_list_tree_visits_directory_before_longer_sibling() {
        let mut fs = MemoryFS::new();
        fs.add_files(["/r/a.txt", "/r/a/b.txt", "/r/ab"]).unwrap();
        let entries = fs.list_tree(Path::new("/r")).unwrap();
        assert_eq!(relatives(&entries), vec!["", "a", "a/b.txt", "a.txt", "ab"]);
    }

    #[test]
    fn test_memory_fs_list_tree_of_file() {
        let fs = fixture();
        let entries = fs
            .list_tree(Path::new("/pkg/assets/css/style.css"))
            .unwrap();
        assert_eq!(relatives(&entries), vec![""]);
    }

    #[test]
    fn test_memory_fs_list_tree_missing_root() {
        let fs = fixture();
        assert!(matches!(
            fs.list_tree(Path::new("/pkg/nope")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_memory_fs_normalizes_dot_segments() {
        let fs = fixture();
        assert!(fs.exists(Path::new("/pkg/./resources/../assets")));
    }

    #[test]
    fn test_memory_fs_rejects_file_over_directory() {
        let mut fs = fixture();
        assert!(fs.add_file("/pkg/resources").is_err());
        assert!(fs.add_dir("/pkg/resources/css/style.css").is_err());
        assert!(fs.add_file("/pkg/resources/css/style.css/inner").is_err());
    }

    #[test]
    fn test_memory_fs_empty_directory() {
        let mut fs = MemoryFS::new();
        assert!(fs.is_empty());
        fs.add_dir("/pkg/empty").unwrap();
        assert!(!fs.is_empty());
        assert_eq!(fs.len(), 0);
        let entries = fs.list_tree(Path::new("/pkg")).unwrap();
        assert_eq!(relatives(&entries), vec!["", "empty"]);
    }

    #[test]
    fn test_disk_fs_matches_memory_fs_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("resources");
        std::fs::create_dir_all(root.join("css")).unwrap();
        std::fs::create_dir_all(root.join("config")).unwrap();
        std::fs::write(root.join("css/style.css"), "body {}").unwrap();
        std::fs::write(root.join("config/config.yml"), "a: 1").unwrap();

        let disk = DiskFilesystem::new();
        assert!(disk.exists(&root));
        let entries = disk.list_tree(&root).unwrap();
        assert_eq!(
            relatives(&entries),
            vec!["", "config", "config/config.yml", "css", "css/style.css"]
        );
        assert_eq!(entries[0].path, root);
        assert_eq!(entries[4].path, root.join("css").join("style.css"));
    }

    #[test]
    fn test_disk_fs_missing_root_is_io_error() {
        let temp = TempDir::new().unwrap();
        let disk = DiskFilesystem::with_options(WalkOptions { follow_links: true });
        let missing = temp.path().join("missing");
        assert!(!disk.exists(&missing));
        assert!(matches!(disk.list_tree(&missing), Err(Error::Io(_))));
    }
}
