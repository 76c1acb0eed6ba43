//! Root manifest handling.
//!
//! The compiled package carries one configuration object describing the
//! whole application. [`Manifest`] holds a working copy of it and hands
//! fields out one at a time; whatever is never taken passes through to the
//! reconstructed `app.json` untouched and in its original order.
//!
//! The submodules each handle one concern of the root manifest:
//!
//! - [`pages`]: entry page ordering and subpackage partitioning
//! - [`ext`]: the extension side file
//! - [`tabbar`]: content hash index and tab-bar icon re-linking
//! - [`components`]: the page table and component usage graph

pub mod components;
pub mod ext;
pub mod pages;
pub mod tabbar;

use crate::config::DefaultPolicy;
use crate::error::{Error, Result};
use serde_json::{Map, Value};

pub use components::{resolve_components, resolve_specifier, ComponentStats, PageEntry, PageTable};
pub use ext::ext_config;
pub use pages::{order_entry_page, partition_subpackages, Subpackage};
pub use tabbar::{content_hash, resolve_tab_bar, ContentHashIndex, IconStats};

/// JavaScript truthiness of a JSON value.
///
/// `null`, `false`, `0` and `""` are falsy. Arrays and objects are always
/// truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Mutable working copy of the root manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    fields: Map<String, Value>,
    policy: DefaultPolicy,
}

impl Manifest {
    /// Parses manifest source text. The top level must be an object.
    pub fn parse(source: &str, policy: DefaultPolicy) -> Result<Self> {
        match serde_json::from_str(source)? {
            Value::Object(fields) => Ok(Self::from_map(fields, policy)),
            other => Err(Error::malformed(
                "<root>",
                format!("expected an object, found {}", type_name(&other)),
            )),
        }
    }

    /// Wraps an already parsed manifest object
    pub fn from_map(fields: Map<String, Value>, policy: DefaultPolicy) -> Self {
        Self { fields, policy }
    }

    /// Removes `key` and returns its value.
    ///
    /// The key is always removed. On an absent value (per the configured
    /// [`DefaultPolicy`]) `None` is returned even if something was stored.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        let value = self.fields.shift_remove(key)?;
        let present = match self.policy {
            DefaultPolicy::Truthy => is_truthy(&value),
            DefaultPolicy::Presence => !value.is_null(),
        };
        present.then_some(value)
    }

    /// Like [`take`](Self::take), substituting `default` for an absent value
    pub fn take_or(&mut self, key: &str, default: Value) -> Value {
        self.take(key).unwrap_or(default)
    }

    /// Takes a string field. Non-string values are a manifest error.
    pub fn take_string(&mut self, key: &str) -> Result<Option<String>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(Error::malformed(
                key,
                format!("expected a string, found {}", type_name(&other)),
            )),
        }
    }

    /// Takes an array of strings. Any other shape is a manifest error.
    pub fn take_string_list(&mut self, key: &str) -> Result<Option<Vec<String>>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(Error::malformed(
                        key,
                        format!("expected string entries, found {}", type_name(&other)),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(Error::malformed(
                key,
                format!("expected an array, found {}", type_name(&other)),
            )),
        }
    }

    /// Returns the stored value without consuming it
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns true if `key` has not been taken yet
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Consumes the manifest, returning every field never taken
    pub fn into_remaining(self) -> Map<String, Value> {
        self.fields
    }
}

/// Short JSON type name for error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn manifest(value: Value, policy: DefaultPolicy) -> Manifest {
        match value {
            Value::Object(map) => Manifest::from_map(map, policy),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn test_take_truthy_substitutes_default_for_falsy() {
        let mut m = manifest(json!({"debug": false, "n": 0, "s": ""}), DefaultPolicy::Truthy);

        assert_eq!(m.take_or("debug", json!("dflt")), json!("dflt"));
        assert_eq!(m.take_or("n", json!(7)), json!(7));
        assert_eq!(m.take("s"), None);
        assert_eq!(m.take_or("missing", json!(1)), json!(1));
        assert!(m.into_remaining().is_empty());
    }

    #[test]
    fn test_take_presence_keeps_falsy() {
        let mut m = manifest(json!({"debug": false, "gone": null}), DefaultPolicy::Presence);

        assert_eq!(m.take_or("debug", json!(true)), json!(false));
        assert_eq!(m.take("gone"), None);
    }

    #[test]
    fn test_remaining_keeps_order() {
        let mut m = manifest(
            json!({"z": 1, "pages": [], "a": 2, "m": 3}),
            DefaultPolicy::Truthy,
        );
        m.take("pages");

        let keys: Vec<_> = m.into_remaining().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_take_string_list_rejects_bad_shapes() {
        let mut m = manifest(json!({"pages": "pages/a", "other": [1]}), DefaultPolicy::Truthy);

        assert!(matches!(
            m.take_string_list("pages"),
            Err(Error::MalformedManifest { .. })
        ));
        assert!(m.take_string_list("other").is_err());
        assert_eq!(m.take_string_list("missing").unwrap(), None);
    }

    #[test]
    fn test_parse_requires_object() {
        assert!(Manifest::parse("[1, 2]", DefaultPolicy::Truthy).is_err());
        assert!(matches!(
            Manifest::parse("{oops", DefaultPolicy::Truthy),
            Err(Error::Json(_))
        ));
        assert!(Manifest::parse("{}", DefaultPolicy::Truthy).is_ok());
    }
}
