//! Output tree abstraction and the write-once gate in front of it.
//!
//! The core never touches the filesystem directly. Every file goes through
//! a [`WriteOnceSink`], which deduplicates by canonical path and hands the
//! first write for each path to an [`OutputTree`].
//!
//! Two trees are provided:
//!
//! - [`FsOutputTree`]: writes below a directory root
//! - [`MemoryOutputTree`]: keeps files in memory, mostly for tests

mod fs;
mod sink;

use crate::error::Result;
use bytes::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;

pub use fs::FsOutputTree;
pub use sink::WriteOnceSink;

/// Content handed to an output tree
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Text written verbatim
    Text(String),
    /// Structured value, JSON-encoded by the writer
    Json(Value),
    /// Raw bytes written verbatim
    Bytes(Bytes),
}

impl Content {
    /// Encodes the content into the bytes that land on disk.
    ///
    /// JSON is pretty-printed with two-space indentation.
    pub fn encode(&self) -> Result<Bytes> {
        Ok(match self {
            Content::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            Content::Json(value) => Bytes::from(serde_json::to_vec_pretty(value)?),
            Content::Bytes(bytes) => bytes.clone(),
        })
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Json(value)
    }
}

/// Destination for reconstructed files.
///
/// Paths are canonical, root-relative and `/`-separated by the time they
/// reach an implementation.
pub trait OutputTree {
    /// Write one file, replacing any previous content
    fn write(&mut self, path: &str, content: &Content) -> Result<()>;

    /// List every file currently in the tree with its raw bytes
    fn files(&self) -> Result<Vec<(String, Bytes)>>;
}

/// In-memory output tree
#[derive(Debug, Default, Clone)]
pub struct MemoryOutputTree {
    files: BTreeMap<String, Bytes>,
}

impl MemoryOutputTree {
    /// Creates an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file, as if an earlier stage had already produced it
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Bytes>) {
        self.files.insert(path.into(), bytes.into());
    }

    /// Returns the bytes stored at `path`
    pub fn get(&self, path: &str) -> Option<&Bytes> {
        self.files.get(path)
    }

    /// Returns the content at `path` as UTF-8 text
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.files
            .get(path)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Returns the content at `path` parsed as JSON
    pub fn get_json(&self, path: &str) -> Option<Value> {
        self.files
            .get(path)
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }

    /// Number of files in the tree
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the tree holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over stored paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl OutputTree for MemoryOutputTree {
    fn write(&mut self, path: &str, content: &Content) -> Result<()> {
        self.files.insert(path.to_string(), content.encode()?);
        Ok(())
    }

    fn files(&self) -> Result<Vec<(String, Bytes)>> {
        Ok(self
            .files
            .iter()
            .map(|(path, bytes)| (path.clone(), bytes.clone()))
            .collect())
    }
}
