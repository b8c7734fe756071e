//! Source locator: which files a monitor looks at

use crate::MonitorError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File selection rule for a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    /// Go sources, tests included
    GoSources,
    /// Go test files (`_test.go`)
    GoTests,
    /// Java sources
    JavaSources,
}

impl FileFilter {
    pub fn matches(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        match self {
            FileFilter::GoSources => name.ends_with(".go"),
            FileFilter::GoTests => name.ends_with("_test.go"),
            FileFilter::JavaSources => name.ends_with(".java"),
        }
    }
}

/// Enumerates candidate files under a repository root
pub struct SourceLocator {
    root: PathBuf,
    filter: FileFilter,
    exclude_dirs: Vec<String>,
}

impl SourceLocator {
    pub fn new(root: impl Into<PathBuf>, filter: FileFilter) -> Self {
        Self {
            root: root.into(),
            filter,
            exclude_dirs: vec![".git".to_string()],
        }
    }

    /// Directory names pruned from the walk
    pub fn with_exclude_dirs(mut self, dirs: &[String]) -> Self {
        self.exclude_dirs = dirs.to_vec();
        if !self.exclude_dirs.iter().any(|d| d == ".git") {
            self.exclude_dirs.push(".git".to_string());
        }
        self
    }

    /// Repository-relative paths to analyze, sorted and deduplicated.
    /// An empty `explicit` list means "walk the whole tree".
    pub fn locate(&self, explicit: &[PathBuf]) -> Result<Vec<PathBuf>, MonitorError> {
        if !self.root.is_dir() {
            return Err(MonitorError::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "repository root is not a directory"),
            ));
        }

        let files = if explicit.is_empty() {
            self.walk()?
        } else {
            explicit
                .iter()
                .filter(|p| self.filter.matches(p))
                .map(|p| self.relativize(p))
                .collect::<BTreeSet<_>>()
        };

        debug!(count = files.len(), root = %self.root.display(), "located files");
        Ok(files.into_iter().collect())
    }

    fn walk(&self) -> Result<BTreeSet<PathBuf>, MonitorError> {
        let mut files = BTreeSet::new();
        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !self
                    .exclude_dirs
                    .iter()
                    .any(|d| e.file_name() == d.as_str())
        });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                MonitorError::io(path, source)
            })?;
            if entry.file_type().is_file() && self.filter.matches(entry.path()) {
                if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                    files.insert(rel.to_path_buf());
                }
            }
        }
        Ok(files)
    }

    /// Make a caller-supplied path relative to the root
    fn relativize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf());
        }
        if self.root.join(path).exists() {
            return path.to_path_buf();
        }
        // Relative to the working directory (e.g. `repo/internal/x.go`)
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "package x\n").unwrap();
    }

    #[test]
    fn walk_collects_go_files_and_skips_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "main.go");
        touch(dir.path(), "internal/a.go");
        touch(dir.path(), "internal/a_test.go");
        touch(dir.path(), "vendor/lib/b.go");
        touch(dir.path(), "README.md");

        let locator = SourceLocator::new(dir.path(), FileFilter::GoSources)
            .with_exclude_dirs(&["vendor".to_string()]);
        let files = locator.locate(&[]).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("internal/a.go"),
                PathBuf::from("internal/a_test.go"),
                PathBuf::from("main.go"),
            ]
        );
    }

    #[test]
    fn test_filter_keeps_only_test_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.go");
        touch(dir.path(), "a_test.go");
        let files = SourceLocator::new(dir.path(), FileFilter::GoTests)
            .locate(&[])
            .unwrap();
        assert_eq!(files, vec![PathBuf::from("a_test.go")]);
    }

    #[test]
    fn explicit_list_is_filtered_and_relativized() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "internal/a.go");
        let explicit = vec![
            dir.path().join("internal/a.go"),
            PathBuf::from("notes.txt"),
            PathBuf::from("internal/a.go"),
        ];
        let files = SourceLocator::new(dir.path(), FileFilter::GoSources)
            .locate(&explicit)
            .unwrap();
        assert_eq!(files, vec![PathBuf::from("internal/a.go")]);
    }

    #[test]
    fn missing_root_is_io_error() {
        let err = SourceLocator::new("/definitely/not/here", FileFilter::GoSources)
            .locate(&[])
            .unwrap_err();
        assert!(matches!(err, MonitorError::Io { .. }));
    }
}
