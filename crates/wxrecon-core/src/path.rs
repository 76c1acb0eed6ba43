//! Page keys and the small amount of path canonicalization they need.
//!
//! Every path handled by the core is a forward-slash, root-relative string.
//! [`PageKey`] additionally drops the extension of its final segment, so
//! `pages/index.js`, `/pages/index` and `pages\index.json` all name the
//! same page.

use std::borrow::Borrow;
use std::fmt;

/// Suffix of per-page configuration files
pub const CONFIG_SUFFIX: &str = ".json";

/// Canonicalizes a path: `/` separators, no leading root, `.` and `..`
/// segments resolved. `..` at the top level is dropped.
pub fn normalize(raw: &str) -> String {
    let unix = raw.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unix.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Returns the extension of the final segment, without the dot.
///
/// Dotfiles such as `.gitignore` have no extension.
pub fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Removes the extension of the final segment, if any.
pub fn strip_extension(path: &str) -> &str {
    match extension(path) {
        Some(ext) => &path[..path.len() - ext.len() - 1],
        None => path,
    }
}

/// Maps a page key or registry path to its configuration file path.
pub fn config_path(path: &str) -> String {
    let path = normalize(path);
    if path.ends_with(CONFIG_SUFFIX) {
        path
    } else {
        format!("{path}{CONFIG_SUFFIX}")
    }
}

/// Canonical, extension-less identity of a page or component
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageKey(String);

impl PageKey {
    /// Creates a page key from any spelling of a page path
    pub fn new(raw: &str) -> Self {
        let normalized = normalize(raw);
        Self(strip_extension(&normalized).to_string())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the directory containing this page, `""` at the top level
    pub fn dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Resolves `specifier` relative to this page's directory
    pub fn resolve_relative(&self, specifier: &str) -> Self {
        Self::new(&format!("{}/{}", self.dir(), specifier))
    }

    /// Path of the configuration file for this page
    pub fn config_path(&self) -> String {
        config_path(&self.0)
    }

    /// Consumes the key, returning the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PageKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
