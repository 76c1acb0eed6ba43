//! Filesystem-backed output tree.

use super::{Content, OutputTree};
use crate::error::{Error, Result};
use bytes::Bytes;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// Writes files below a directory root
#[derive(Debug, Clone)]
pub struct FsOutputTree {
    root: PathBuf,
}

impl FsOutputTree {
    /// Creates a tree rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a relative path onto the root, rejecting anything that could
    /// escape it
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || path.is_empty() {
            return Err(Error::path_traversal(relative));
        }
        Ok(self.root.join(relative))
    }
}

impl OutputTree for FsOutputTree {
    fn write(&mut self, path: &str, content: &Content) -> Result<()> {
        let target = self.resolve(path)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::directory_create(parent, e))?;
        }

        let bytes = content.encode()?;
        fs::write(&target, &bytes).map_err(|e| Error::file_write(&target, e))?;
        trace!("Wrote {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }

    fn files(&self) -> Result<Vec<(String, Bytes)>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let bytes = fs::read(path).map_err(|e| Error::file_read(path, e))?;
            files.push((key, Bytes::from(bytes)));
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let mut tree = FsOutputTree::new(temp_dir.path());

        tree.write("pages/index/index.json", &Content::from("{}"))
            .unwrap();

        let written = fs::read_to_string(temp_dir.path().join("pages/index/index.json")).unwrap();
        assert_eq!(written, "{}");
    }

    #[test]
    fn test_rejects_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let mut tree = FsOutputTree::new(temp_dir.path());

        let err = tree.write("../escape.json", &Content::from("{}")).unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
        let err = tree.write("/abs.json", &Content::from("{}")).unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[test]
    fn test_files_lists_relative_unix_paths() {
        let temp_dir = TempDir::new().unwrap();
        let mut tree = FsOutputTree::new(temp_dir.path());
        tree.write("img/tab/home.png", &Content::Bytes(Bytes::from_static(b"\x89PNG")))
            .unwrap();
        tree.write("app.json", &Content::from("{}")).unwrap();

        let mut files = tree.files().unwrap();
        files.sort();
        assert_eq!(files[0].0, "app.json");
        assert_eq!(files[1].0, "img/tab/home.png");
        assert_eq!(&files[1].1[..], b"\x89PNG");
    }

    #[test]
    fn test_files_on_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let tree = FsOutputTree::new(temp_dir.path().join("not-yet"));
        assert!(tree.files().unwrap().is_empty());
    }
}
