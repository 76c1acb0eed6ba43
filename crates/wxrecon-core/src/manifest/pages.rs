//! Entry page ordering and subpackage partitioning.

use super::type_name;
use crate::error::{Error, Result};
use crate::path::PageKey;
use serde_json::Value;
use tracing::trace;

/// A subpackage after partitioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subpackage {
    /// Path prefix shared by the subpackage's pages
    pub root: String,
    /// Pages relative to `root`
    pub pages: Vec<String>,
}

/// Moves the entry page to the front of `pages`.
///
/// The entry path is canonicalized first. If it is not in the list, the
/// list is left untouched and `false` is returned.
pub fn order_entry_page(pages: &mut Vec<String>, entry_page_path: &str) -> bool {
    let entry = PageKey::new(entry_page_path).into_string();
    let Some(index) = pages.iter().position(|p| *p == entry) else {
        trace!("Entry page {} not in page list", entry);
        return false;
    };
    let page = pages.remove(index);
    pages.insert(0, page);
    true
}

/// Splits `pages` between the root package and the given subpackage
/// descriptors.
///
/// Descriptors are processed in order. A descriptor's page set is its own
/// `pages` array if it has one, otherwise every remaining root page that
/// starts with its `root`. Each selected page is removed from the root list
/// once, unless it sits at index 0. The descriptor's `pages` is rewritten
/// relative to `root`; its other fields are left alone.
pub fn partition_subpackages(
    pages: &mut Vec<String>,
    descriptors: &mut [Value],
) -> Result<Vec<Subpackage>> {
    let mut partitioned = Vec::with_capacity(descriptors.len());

    for (i, descriptor) in descriptors.iter_mut().enumerate() {
        let field = format!("subPackages[{i}]");
        let descriptor = match descriptor {
            Value::Object(map) => map,
            other => {
                return Err(Error::malformed(
                    field,
                    format!("expected an object, found {}", type_name(other)),
                ))
            }
        };

        let root = match descriptor.get("root") {
            Some(Value::String(root)) => root.clone(),
            other => {
                return Err(Error::malformed(
                    format!("{field}.root"),
                    format!(
                        "expected a string, found {}",
                        other.map_or("nothing", type_name)
                    ),
                ))
            }
        };

        let selected: Vec<String> = match descriptor.get("pages") {
            Some(Value::Array(explicit)) => explicit
                .iter()
                .map(|p| match p {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(Error::malformed(
                        format!("{field}.pages"),
                        format!("expected string entries, found {}", type_name(other)),
                    )),
                })
                .collect::<Result<_>>()?,
            Some(Value::Null) | None => pages
                .iter()
                .filter(|p| p.starts_with(root.as_str()))
                .cloned()
                .collect(),
            Some(other) => {
                return Err(Error::malformed(
                    format!("{field}.pages"),
                    format!("expected an array, found {}", type_name(other)),
                ))
            }
        };

        let relative: Vec<String> = selected
            .iter()
            .map(|page| {
                if let Some(index) = pages.iter().position(|p| p == page) {
                    // index 0 holds the entry page
                    if index > 0 {
                        pages.remove(index);
                    }
                }
                page.replacen(root.as_str(), "", 1)
            })
            .collect();

        descriptor.insert(
            "pages".to_string(),
            Value::Array(relative.iter().cloned().map(Value::String).collect()),
        );
        partitioned.push(Subpackage {
            root,
            pages: relative,
        });
    }

    Ok(partitioned)
}
