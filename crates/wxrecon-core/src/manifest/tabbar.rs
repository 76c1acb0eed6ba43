//! Tab-bar icon re-linking.
//!
//! Packages embed tab-bar icons twice: once as a real image file and once
//! as base64 `iconData` inside the manifest. The reconstructed `app.json`
//! should reference the file instead, so already written outputs are
//! indexed by content hash and every inline icon is looked up in that index.

use crate::config::ParserConfig;
use crate::error::Result;
use crate::output::OutputTree;
use crate::path::{extension, normalize, PageKey};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, trace};

/// (inline data field, path field) pairs of a tab-bar item
const ICON_SLOTS: &[(&str, &str)] = &[
    ("iconData", "iconPath"),
    ("selectedIconData", "selectedIconPath"),
];

/// Hash used for both indexed files and inline icon data
pub fn content_hash(bytes: &[u8]) -> blake3::Hash {
    blake3::hash(bytes)
}

/// Map from content hash to the output path holding those bytes
#[derive(Debug, Default, Clone)]
pub struct ContentHashIndex {
    paths: HashMap<blake3::Hash, String>,
}

impl ContentHashIndex {
    /// Indexes every file of `tree` whose extension is not ignored by
    /// `config`.
    ///
    /// When several files share content, the lexicographically smallest
    /// path is kept.
    pub fn build<T: OutputTree>(tree: &T, config: &ParserConfig) -> Result<Self> {
        let mut files = tree.files()?;
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut index = Self::default();
        for (path, bytes) in files {
            if extension(&path).is_some_and(|ext| config.is_ignored_icon_extension(ext)) {
                continue;
            }
            index.insert(&path, &bytes);
        }
        debug!("Indexed {} output files by content", index.len());
        Ok(index)
    }

    /// Adds a file unless its content is already indexed
    pub fn insert(&mut self, path: &str, bytes: &[u8]) {
        self.paths
            .entry(content_hash(bytes))
            .or_insert_with(|| normalize(path));
    }

    /// Looks up the path of a file with exactly these bytes
    pub fn lookup(&self, bytes: &[u8]) -> Option<&str> {
        self.paths.get(&content_hash(bytes)).map(String::as_str)
    }

    /// Looks up base64 inline data. Undecodable data never matches.
    pub fn lookup_inline(&self, data: &str) -> Option<&str> {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        match STANDARD.decode(compact.as_bytes()) {
            Ok(bytes) => self.lookup(&bytes),
            Err(e) => {
                trace!("Inline icon data is not base64: {}", e);
                None
            }
        }
    }

    /// Number of indexed distinct contents
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Outcome of icon resolution
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IconStats {
    /// Slots rewritten to a path reference
    pub resolved: usize,
    /// Slots left with their inline data
    pub unresolved: usize,
}

/// Normalizes every `tabBar.list` entry and re-links inline icons.
///
/// A matched slot gets its path field set and its data field removed. An
/// unmatched slot keeps its data.
pub fn resolve_tab_bar(tab_bar: &mut Value, index: &ContentHashIndex) -> IconStats {
    let mut stats = IconStats::default();
    let Some(Value::Array(list)) = tab_bar.get_mut("list") else {
        return stats;
    };

    for item in list.iter_mut() {
        let Value::Object(item) = item else {
            continue;
        };
        if let Some(Value::String(page_path)) = item.get("pagePath") {
            let key = PageKey::new(page_path).into_string();
            item.insert("pagePath".to_string(), Value::String(key));
        }
        for (data_field, path_field) in ICON_SLOTS {
            resolve_slot(item, data_field, path_field, index, &mut stats);
        }
    }

    stats
}

fn resolve_slot(
    item: &mut Map<String, Value>,
    data_field: &str,
    path_field: &str,
    index: &ContentHashIndex,
    stats: &mut IconStats,
) {
    let Some(Value::String(data)) = item.get(data_field) else {
        return;
    };
    if data.is_empty() {
        return;
    }
    match index.lookup_inline(data) {
        Some(path) => {
            item.insert(path_field.to_string(), Value::String(path.to_string()));
            item.shift_remove(data_field);
            stats.resolved += 1;
        }
        None => {
            trace!("No output file matches inline {}", data_field);
            stats.unresolved += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryOutputTree;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nhome-icon";

    fn tree_with_icon() -> MemoryOutputTree {
        let mut tree = MemoryOutputTree::new();
        tree.insert("images/home.png", PNG.to_vec());
        tree.insert("pages/index.wxml", PNG.to_vec());
        tree
    }

    #[test]
    fn test_index_skips_text_assets() {
        let mut tree = MemoryOutputTree::new();
        tree.insert("pages/index.wxml", PNG.to_vec());
        tree.insert("pages/index.json", b"{}".to_vec());

        let index = ContentHashIndex::build(&tree, &ParserConfig::default()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_prefers_smallest_path() {
        let index = ContentHashIndex::build(&tree_with_icon(), &ParserConfig::default()).unwrap();
        assert_eq!(index.lookup(PNG), Some("images/home.png"));

        let mut tree = tree_with_icon();
        tree.insert("a/copy.png", PNG.to_vec());
        let index = ContentHashIndex::build(&tree, &ParserConfig::default()).unwrap();
        assert_eq!(index.lookup(PNG), Some("a/copy.png"));
    }

    #[test]
    fn test_inline_icon_relinked() {
        let index = ContentHashIndex::build(&tree_with_icon(), &ParserConfig::default()).unwrap();
        let mut tab_bar = json!({
            "color": "#000",
            "list": [{
                "pagePath": "pages/index.html",
                "text": "Home",
                "iconData": STANDARD.encode(PNG),
                "selectedIconData": STANDARD.encode(b"other bytes"),
            }]
        });

        let stats = resolve_tab_bar(&mut tab_bar, &index);

        assert_eq!(stats, IconStats { resolved: 1, unresolved: 1 });
        let item = &tab_bar["list"][0];
        assert_eq!(item["pagePath"], json!("pages/index"));
        assert_eq!(item["iconPath"], json!("images/home.png"));
        assert!(item.get("iconData").is_none());
        assert_eq!(item["selectedIconData"], json!(STANDARD.encode(b"other bytes")));
        assert!(item.get("selectedIconPath").is_none());
    }

    #[test]
    fn test_inline_data_with_line_breaks() {
        let index = ContentHashIndex::build(&tree_with_icon(), &ParserConfig::default()).unwrap();
        let encoded = STANDARD.encode(PNG);
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);
        assert_eq!(index.lookup_inline(&wrapped), Some("images/home.png"));
        assert_eq!(index.lookup_inline("***not base64***"), None);
    }

    #[test]
    fn test_tab_bar_without_list_is_untouched() {
        let index = ContentHashIndex::default();
        let mut tab_bar = json!({"color": "#fff"});
        assert_eq!(resolve_tab_bar(&mut tab_bar, &index), IconStats::default());
        assert_eq!(tab_bar, json!({"color": "#fff"}));
    }
}
