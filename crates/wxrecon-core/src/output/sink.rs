//! Path-deduplicating output gate.

use super::{Content, OutputTree};
use crate::error::Result;
use crate::path::normalize;
use std::collections::HashSet;
use tracing::trace;

/// Ensures every canonical path is written at most once per run.
///
/// The first `save` for a path wins; later saves for the same path are
/// silently dropped.
#[derive(Debug)]
pub struct WriteOnceSink<T> {
    tree: T,
    written: HashSet<String>,
}

impl<T: OutputTree> WriteOnceSink<T> {
    /// Wraps an output tree
    pub fn new(tree: T) -> Self {
        Self {
            tree,
            written: HashSet::new(),
        }
    }

    /// Writes `content` at `path` unless the path was already written.
    ///
    /// Returns `true` if the content was handed to the tree.
    pub fn save(&mut self, path: &str, content: impl Into<Content>) -> Result<bool> {
        let canonical = normalize(path);
        if self.written.contains(&canonical) {
            trace!("Skipping already written path: {}", canonical);
            return Ok(false);
        }
        self.written.insert(canonical.clone());
        self.tree.write(&canonical, &content.into())?;
        Ok(true)
    }

    /// Returns true if `path` has already been written through this sink
    pub fn is_written(&self, path: &str) -> bool {
        self.written.contains(&normalize(path))
    }

    /// Number of distinct paths written
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Borrows the underlying tree
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Unwraps the underlying tree
    pub fn into_inner(self) -> T {
        self.tree
    }
}
